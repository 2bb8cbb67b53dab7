// VirtualMachine command implementations
//
// Class lookup, used to resolve step targets by name

use crate::commands::{command_sets, vm_commands};
use crate::connection::JdwpConnection;
use crate::events::write_string;
use crate::protocol::{CommandPacket, JdwpResult};
use crate::reader::{read_count, read_i32, read_u64, read_u8};
use crate::types::ReferenceTypeId;
use serde::{Deserialize, Serialize};

/// Class information from ClassesBySignature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub ref_type_tag: u8, // 1=class, 2=interface, 3=array
    pub type_id: ReferenceTypeId,
    pub signature: String,
    pub status: i32,
}

/// Convert a dotted class name into a JVM type signature
///
/// `com.example.Foo` becomes `Lcom/example/Foo;`; signatures pass through.
pub fn class_signature(class_name: &str) -> String {
    if class_name.starts_with('L') && class_name.ends_with(';') {
        class_name.to_string()
    } else {
        format!("L{};", class_name.replace('.', "/"))
    }
}

impl JdwpConnection {
    /// Find classes by signature (VirtualMachine.ClassesBySignature command)
    /// Signature format: "Lcom/example/MyClass;" for classes
    pub async fn classes_by_signature(&self, signature: &str) -> JdwpResult<Vec<ClassInfo>> {
        let mut packet = CommandPacket::new(
            self.next_id(),
            command_sets::VIRTUAL_MACHINE,
            vm_commands::CLASSES_BY_SIGNATURE,
        );
        write_string(&mut packet.data, signature);

        let reply = self.send_command(packet).await?;
        reply.check_error()?;

        let mut data = reply.data();

        let classes_count = read_count(&mut data, 1 + 8 + 4)?;
        let mut classes = Vec::with_capacity(classes_count);

        for _ in 0..classes_count {
            let ref_type_tag = read_u8(&mut data)?;
            let type_id = read_u64(&mut data)?;
            let status = read_i32(&mut data)?;

            classes.push(ClassInfo {
                ref_type_tag,
                type_id,
                signature: signature.to_string(),
                status,
            });
        }

        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_signature() {
        assert_eq!(class_signature("com.example.Foo"), "Lcom/example/Foo;");
        assert_eq!(class_signature("Lcom/example/Foo;"), "Lcom/example/Foo;");
    }
}
