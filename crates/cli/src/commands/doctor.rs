//! `lawdesk doctor` — Diagnose configuration.

use lawdesk_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 LawDesk Doctor — Configuration Check");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file, using defaults. Run `lawdesk onboard` to create one");
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            println!("     Model:        {}", config.model);
            println!("     Statute mode: {:?}", config.statute_mode);
            println!("     Registry:     {} ({}s timeout)", config.registry.base_url, config.registry.timeout_secs);
            println!("     LLM:          {} ({}s timeout)", config.llm.base_url, config.llm.timeout_secs);

            if config.has_api_key() {
                println!("  ✅ API key configured");
            } else {
                println!("  ❌ No API key. Set GEMINI_API_KEY or add api_key to config.toml");
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
