// Step into a method of a live JVM
//
// Usage: step_into [host] [port] [thread-name] [class method]
//
// Suspends the VM, steps into on the named thread (default "main") and waits
// for the step to land. With a class and method the step runs to the first
// line of that method.

use anyhow::{bail, Context};
use jdwp_client::types::Location;
use jdwp_client::vm::class_signature;
use jdwp_client::{EventKind, JdwpConnection, SuspendPolicy};
use jdwp_stepping::{
    BreakpointStepMethodFilter, DebuggerSettings, JdwpDebugProcess, MethodFilter,
    StepIntoCommand, StepSize, SuspendContext,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jdwp_stepping=debug,jdwp_client=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let host = args.first().map(String::as_str).unwrap_or("localhost");
    let port: u16 = match args.get(1) {
        Some(port) => port.parse().context("invalid port")?,
        None => 5005,
    };
    let thread_name = args.get(2).map(String::as_str).unwrap_or("main");

    let settings = match std::env::var("JDWP_STEPPING_SETTINGS") {
        Ok(path) => DebuggerSettings::load(&path)
            .with_context(|| format!("loading settings from {}", path))?,
        Err(_) => DebuggerSettings::default(),
    };

    let connection = JdwpConnection::connect(host, port).await?;
    println!("✓ Connected to JVM at {}:{}", host, port);

    connection.suspend_all().await?;

    let mut target_thread = None;
    for thread in connection.get_all_threads().await? {
        if connection.thread_name(thread).await? == thread_name {
            target_thread = Some(thread);
            break;
        }
    }
    let Some(thread) = target_thread else {
        connection.resume_all().await?;
        bail!("no thread named {:?}", thread_name);
    };
    println!("✓ Thread {:?} (id: {:x})", thread_name, thread);

    let method_filter = match (args.get(3), args.get(4)) {
        (Some(class_name), Some(method_name)) => {
            Some(resolve_target(&connection, class_name, method_name).await?)
        }
        _ => None,
    };

    let process = Arc::new(JdwpDebugProcess::new(connection, settings));
    let context = Arc::new(SuspendContext::new(SuspendPolicy::All, Some(thread)));

    let command = StepIntoCommand::create(
        Arc::clone(&process),
        context,
        false,
        method_filter,
        StepSize::Line,
    )
    .context("debug process cannot step into")?;
    command.execute().await;

    println!("⏳ Waiting for the step to complete...");

    while let Some(event_set) = process.connection().recv_event().await {
        if event_set
            .events
            .iter()
            .any(|event| matches!(event.details, EventKind::VMDeath))
        {
            println!("VM exited before the step completed");
            return Ok(());
        }

        if let Some(hint) = process.handle_event_set(&event_set).await {
            let location = event_set.events.iter().find_map(|event| match event.details {
                EventKind::Breakpoint { location, .. } | EventKind::Step { location, .. } => {
                    Some(location)
                }
                _ => None,
            });
            println!(
                "✅ Step into finished on thread {:x} at {:?} (filters ignored: {})",
                thread,
                location,
                hint.ignore_filters()
            );
            break;
        }
    }

    let blocked = process.blocked_threads().await;
    if !blocked.is_empty() {
        println!("⚠ Threads blocked on monitors: {:x?}", blocked);
    }

    process.connection().resume_all().await?;
    Ok(())
}

async fn resolve_target(
    connection: &JdwpConnection,
    class_name: &str,
    method_name: &str,
) -> anyhow::Result<MethodFilter> {
    let classes = connection
        .classes_by_signature(&class_signature(class_name))
        .await?;
    let class = classes
        .first()
        .with_context(|| format!("class {} is not loaded", class_name))?;

    let methods = connection.get_methods(class.type_id).await?;
    let method = methods
        .iter()
        .find(|m| m.name == method_name)
        .with_context(|| format!("{} has no method {}", class_name, method_name))?;

    let line_table = connection
        .get_line_table(class.type_id, method.method_id)
        .await?;
    println!("✓ Target {}.{} (method_id: {:x})", class_name, method_name, method.method_id);

    Ok(MethodFilter::Breakpoint(BreakpointStepMethodFilter {
        class_name: class_name.to_string(),
        method_name: method_name.to_string(),
        location: Location::in_class(
            class.type_id,
            method.method_id,
            line_table.first_code_index(),
        ),
    }))
}
