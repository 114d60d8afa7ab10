use crate::app::AppContext;
use crate::cli::ShowArgs;
use crate::commands::{load_vault, vault_error};
use serde_json::{Map, Value};
use std::process::ExitCode;

pub fn run(args: ShowArgs, ctx: &AppContext) -> ExitCode {
    let (vault, _path, _lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let record = match vault.record(args.index) {
        Ok(r) => r,
        Err(err) => return vault_error(err),
    };

    if ctx.json {
        let mut obj = Map::new();
        for (column, value) in record.iter() {
            if column == "password" {
                if args.reveal {
                    match vault.get_field(args.index, "password") {
                        Ok(plain) => {
                            obj.insert(column.to_string(), Value::String(plain));
                        }
                        Err(err) => return vault_error(err),
                    }
                } else {
                    obj.insert(column.to_string(), Value::Null);
                }
            } else {
                obj.insert(column.to_string(), Value::String(value.to_string()));
            }
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&Value::Object(obj)).expect("json record to serialize")
        );
        return ExitCode::SUCCESS;
    }

    for (column, value) in record.iter() {
        if column == "password" {
            if args.reveal {
                match vault.get_field(args.index, "password") {
                    Ok(plain) => println!("password: {plain}"),
                    Err(err) => return vault_error(err),
                }
            } else {
                println!("password: ********  (pass --reveal to show)");
            }
        } else {
            println!("{column}: {value}");
        }
    }

    ExitCode::SUCCESS
}
