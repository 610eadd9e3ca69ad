use std::io::{self, Write};

use crate::models::{CLIConfig, ChatResponse, ChatTurn, ProviderList, ProviderStatus};

pub fn banner(cfg: &CLIConfig) {
    println!("Chat Relay Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                 Show commands");
    println!("  /exit | /quit         Exit");
    println!("  /history              Show chat history");
    println!("  /reset                Clear chat history");
    println!("  /providers            List configured providers");
    println!("  /health               Show server and provider health");
    println!("  /config               Show current config");
    println!("  /base <url>           Update base URL");
    println!("  /debug [on|off]       Toggle debug output");
}

pub fn response(resp: &ChatResponse, debug: bool) {
    println!("assistant> {}", resp.reply);
    if let Some(image) = &resp.image {
        println!("image: {}", image);
    }
    if debug {
        if let Some(failure) = &resp.failure {
            println!("failure: {} ({})", failure, resp.error.clone().unwrap_or_default());
        }
    }
}

pub fn providers(list: &ProviderList) {
    if list.count == 0 {
        println!("no providers configured (fallback mode)");
        return;
    }
    println!("{} provider(s): {}", list.count, list.providers.join(", "));
}

pub fn provider_health(items: &[ProviderStatus]) {
    for item in items {
        let state = if item.healthy { "healthy" } else { "unhealthy" };
        println!(
            "  {:<14} {:<40} {:<9} failures={} last_error={}",
            item.name,
            item.model,
            state,
            item.failure_count,
            item.last_error.clone().unwrap_or_else(|| "-".to_string())
        );
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  debug: {}", cfg.debug);
}

pub fn history(items: &[ChatTurn]) {
    if items.is_empty() {
        println!("no history");
        return;
    }
    for msg in items {
        println!("{}> {}", msg.role, msg.content);
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
