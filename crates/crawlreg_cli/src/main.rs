//! Command-line host for the registry.
//!
//! # Responsibility
//! - Turn `key=value` arguments or a form body into one registry action.
//! - Print the JSON response envelope and map its status to an exit code.
//!
//! Usage:
//! - `crawlreg action=createOrganization name=Acme`
//! - `crawlreg --form 'action=getOrgConfig&orgId=1000000000000'`
//! - `crawlreg ping` / `crawlreg version`

use crawlreg_core::{
    dispatch, init_logging, ActionRequest, ActionResponse, RegistryService, RegistrySettings,
};
use log::info;
use std::collections::BTreeMap;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    match args.first().map(String::as_str) {
        Some("ping") => {
            println!("crawlreg_core ping={}", crawlreg_core::ping());
            return ExitCode::SUCCESS;
        }
        Some("version") => {
            println!("crawlreg_core version={}", crawlreg_core::core_version());
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    match run(&args) {
        Ok(response) => {
            println!("{}", render(&response));
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(message) => {
            eprintln!("crawlreg: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &[String]) -> Result<ActionResponse, String> {
    let settings = RegistrySettings::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &settings.log_dir {
        init_logging(settings.log_level, log_dir)?;
    }

    let request = match parse_request(args) {
        Ok(request) => request,
        Err(err) => return Ok(err.into()),
    };

    let store = settings
        .open_store()
        .map_err(|err| format!("failed to open store: {err}"))?;
    let service = RegistryService::new(store);
    info!(
        "event=cli_action module=cli action={} backend={:?}",
        request.label(),
        settings.backend
    );
    Ok(dispatch(&service, request))
}

fn parse_request(args: &[String]) -> Result<ActionRequest, crawlreg_core::ActionError> {
    if let [flag, body] = args {
        if flag == "--form" {
            return ActionRequest::from_form(body);
        }
    }

    let fields = args
        .iter()
        .filter_map(|arg| arg.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<BTreeMap<_, _>>();
    ActionRequest::from_fields(&fields)
}

fn render(response: &ActionResponse) -> String {
    serde_json::to_string_pretty(&response.body).unwrap_or_else(|_| response.body.to_string())
}
