use anyhow::{bail, Context, Result};
use dialoguer::{Input, Select};
use minijinja::Environment;
use std::path::Path;

const TEMPLATE: &str = include_str!("../../templates/railup.toml.j2");

pub fn run(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }

    let default_name = std::env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "myapp".to_string());

    let project_name: String = Input::new()
        .with_prompt("Project name")
        .default(default_name)
        .interact_text()?;

    let working_dir: String = Input::new()
        .with_prompt("Directory to deploy from")
        .default(".".to_string())
        .interact_text()?;

    let environments = ["(linked default)", "production", "staging"];
    let env_idx = Select::new()
        .with_prompt("Railway environment")
        .items(&environments)
        .default(0)
        .interact()?;
    let environment = (env_idx > 0).then(|| environments[env_idx]);

    let content = render(&project_name, &working_dir, environment)?;
    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    crate::output::success(&format!("Created {}", config_path.display()));
    crate::output::info("Store secret values with: railup secrets init && railup secrets set KEY=VALUE");

    Ok(())
}

pub fn render(project_name: &str, working_dir: &str, environment: Option<&str>) -> Result<String> {
    let mut env = Environment::new();
    env.add_filter("toml", toml_string);
    env.add_template("railup.toml", TEMPLATE)?;
    let tmpl = env.get_template("railup.toml")?;
    let content = tmpl.render(minijinja::context! {
        project_name => project_name,
        working_dir => working_dir,
        token_env => "RAILWAY_TOKEN",
        environment => environment,
    })?;
    Ok(content)
}

/// Quote a value as a TOML string, escaping backslashes and quotes.
fn toml_string(value: String) -> String {
    toml::Value::String(value).to_string()
}
