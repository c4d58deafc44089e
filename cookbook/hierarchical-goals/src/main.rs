use autogoal::{init_logging, Agent, AppConfig, Goal};
use serde_json::json;

#[tokio::main]
async fn main() -> autogoal::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_env_or_file(path)?,
        None => {
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    init_logging(&config.logging);

    let mut agent = Agent::new(config.agent).with_name("Planner");
    let plan = agent.add_goal(
        Goal::new("Plan and execute a calculation")
            .with_priority(10)
            .with_sub_goal(Goal::new("add 5 and 3").with_priority(8))
            .with_sub_goal(Goal::new("multiply 8 by 2").with_priority(7))
            .with_sub_goal(Goal::new("subtract 4 from 16").with_priority(6)),
    )?;
    agent.add_goal(Goal::new("echo all done").with_priority(1))?;
    agent.add_goal(
        Goal::new("report the result")
            .with_metadata("tool", json!("echo"))
            .with_metadata("arguments", json!({"message": "calculation finished"})),
    )?;

    println!("{}", agent.think("starting up"));
    let summary = agent.run_configured().await?;
    tracing::info!(?summary, "agent stopped");

    for step in agent.reasoning_history() {
        println!("--- step {} ---\n{step}", step.step);
    }
    if let Some(goal) = agent.goal(&plan) {
        println!("plan {} with {:?}", goal.status(), goal.result());
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&agent.get_status()).unwrap_or_default()
    );
    Ok(())
}
