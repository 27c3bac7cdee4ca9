use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Only non-secret values. API keys and the webhook secret are never printed.
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "UPG_HOST",
        "UPG_PORT",
        "UPG_DATABASE_URL",
        "UPG_PUBLIC_BASE_URL",
        "UPG_CORS_ALLOWED_ORIGINS",
        "UPG_OXAPAY_API_URL",
        "UPG_OXAPAY_TIMEOUT_SECS",
        "UPG_OXAPAY_NETWORK",
        "UPG_WEBHOOK_HMAC_CHECKS",
        "UPG_WEBHOOK_SUCCESS_STATUSES",
        "UPG_CORRELATION_FIELD",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
