use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::commands::load_vault;
use crate::stringutil::contains;
use serde_json::{json, Value};
use std::process::ExitCode;

pub fn run(args: ListArgs, ctx: &AppContext) -> ExitCode {
    let (vault, _path, _lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let mut matched = Vec::new();
    for (index, record) in vault.records().iter().enumerate() {
        if let Some(query) = &args.query {
            let matches = record
                .iter()
                .filter(|(column, _)| *column != "password")
                .any(|(_, value)| contains(value, query));
            if !matches {
                continue;
            }
        }
        matched.push((index, record));
    }

    if ctx.json {
        let items: Vec<Value> = matched
            .iter()
            .map(|(index, record)| {
                json!({
                    "index": index,
                    "site": record.get("site").unwrap_or(""),
                    "user": record.get("user").unwrap_or(""),
                    "tags": record.get("tags").unwrap_or(""),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items).expect("json list to serialize"));
        return ExitCode::SUCCESS;
    }

    for (index, record) in matched {
        let site = record.get("site").unwrap_or("");
        let user = record.get("user").unwrap_or("");
        let tags = record.get("tags").unwrap_or("");
        println!("{index:>3}  {site:<30}  {user:<20}  {tags}");
    }

    ExitCode::SUCCESS
}
