use std::sync::Arc;

use fileflow::{
    EngineBuilder, WorkflowModel,
    collab::{MemDirectory, ROLE_DEPARTMENT_ADMIN, User},
    runtime::StepOptions,
    store::data::File,
};

fn main() {
    let directory = Arc::new(MemDirectory::new());
    directory.add_user(User::new("so1", "Section officer").in_department("d1").with_role("section_officer"));
    directory.add_user(User::new("hod", "Head of department").in_department("d1").with_role(ROLE_DEPARTMENT_ADMIN));

    let engine = EngineBuilder::new().directory(directory).build().unwrap();
    engine.launch();

    let text = include_str!("./workflow.json");
    let workflow_model = WorkflowModel::from_json(text).unwrap();
    let def = engine.deploy(&workflow_model, "designer").unwrap();
    engine.publish_workflow(&def.workflow.id, "admin").unwrap();

    // already past its due date, so the red-list sweep picks it up
    let mut file = File::new("F-2026-001", "Leave request", "d1", "clerk");
    file.assigned_to = Some("so1".to_string());
    file.due_date = Some(chrono::Utc::now().timestamp_millis() - 1_000);
    let file = engine.register_file(file).unwrap();

    let execution = engine.start_workflow(&def.workflow.id, &file.id, None).unwrap();
    let submitted = engine.execute_step(&execution.id, "clerk", "submit", StepOptions::default()).unwrap();
    println!("Submitted, now at: {:?}", submitted.next_node.map(|n| n.label));
    println!("Available actions: {:?}", engine.get_available_actions(&execution.id).unwrap());

    let approved = engine.execute_step(&execution.id, "so1", "approve", StepOptions::default()).unwrap();
    println!("Execution status: {}", approved.execution.status);

    let timing = engine.update_all_time_remaining().unwrap();
    println!("Timers updated: {}", timing.updated);
    let red_list = engine.update_red_list().unwrap();
    println!("Red-listed files: {:?}", red_list.red_listed);

    if let Some(outbox) = engine.outbox() {
        while let Some(notification) = outbox.try_next() {
            println!("[{}] {}: {}", notification.kind, notification.user_id, notification.message);
        }
    }

    engine.shutdown();
}
