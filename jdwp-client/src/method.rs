// Method command implementations
//
// Line tables map source lines to bytecode positions; the first entry of
// a method is where a step-into target breakpoint goes.

use crate::commands::{command_sets, method_commands};
use crate::connection::JdwpConnection;
use crate::protocol::{CommandPacket, JdwpResult};
use crate::reader::{read_count, read_i32, read_u64};
use crate::types::{MethodId, ReferenceTypeId};
use bytes::BufMut;
use serde::{Deserialize, Serialize};

/// Line table entry - maps source line to bytecode index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineTableEntry {
    pub line_code_index: u64, // bytecode index
    pub line_number: i32,     // source line number
}

/// Complete line table for a method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineTable {
    pub start: u64, // starting bytecode index
    pub end: u64,   // ending bytecode index
    pub lines: Vec<LineTableEntry>,
}

impl LineTable {
    /// Lowest bytecode index that has a line attached, or the method start
    pub fn first_code_index(&self) -> u64 {
        self.lines
            .iter()
            .map(|e| e.line_code_index)
            .min()
            .unwrap_or(self.start)
    }
}

impl JdwpConnection {
    /// Get line table for a method (Method.LineTable command)
    pub async fn get_line_table(
        &self,
        ref_type_id: ReferenceTypeId,
        method_id: MethodId,
    ) -> JdwpResult<LineTable> {
        let mut packet = CommandPacket::new(self.next_id(), command_sets::METHOD, method_commands::LINE_TABLE);

        packet.data.put_u64(ref_type_id);
        packet.data.put_u64(method_id);

        let reply = self.send_command(packet).await?;
        reply.check_error()?;

        let mut data = reply.data();

        let start = read_u64(&mut data)?;
        let end = read_u64(&mut data)?;

        let lines_count = read_count(&mut data, 8 + 4)?;
        let mut lines = Vec::with_capacity(lines_count);

        for _ in 0..lines_count {
            lines.push(LineTableEntry {
                line_code_index: read_u64(&mut data)?,
                line_number: read_i32(&mut data)?,
            });
        }

        Ok(LineTable { start, end, lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_code_index() {
        let table = LineTable {
            start: 0,
            end: 40,
            lines: vec![
                LineTableEntry { line_code_index: 8, line_number: 12 },
                LineTableEntry { line_code_index: 4, line_number: 11 },
            ],
        };
        assert_eq!(table.first_code_index(), 4);

        let empty = LineTable { start: 2, end: 2, lines: Vec::new() };
        assert_eq!(empty.first_code_index(), 2);
    }
}
