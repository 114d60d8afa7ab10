use crate::app::AppContext;
use crate::commands::load_vault;
use std::process::ExitCode;

pub fn run(ctx: &AppContext) -> ExitCode {
    let (vault, _path, _lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let tags = vault.tags();
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&tags).expect("json tags to serialize"));
        return ExitCode::SUCCESS;
    }

    for tag in tags {
        println!("{tag}");
    }

    ExitCode::SUCCESS
}
