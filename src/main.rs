use prospectiq::client::AgentServiceConfig;
use prospectiq::extract::parse_lenient;
use prospectiq::locate::{locate, DEFAULT_MAX_DEPTH};
use prospectiq::normalize::{extract_text, normalize};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== ProspectIQ Core ===\n");

    let config = AgentServiceConfig::from_env();
    println!(
        "[config] service url: {}  api key: {}",
        if config.base_url.is_empty() {
            "(unset)"
        } else {
            &config.base_url
        },
        if config.is_configured() {
            "present"
        } else {
            "missing"
        }
    );

    // Walk a canned manager payload through the recovery pipeline: prose
    // wrapping, a code fence, and a stringified nested envelope.
    let raw = r#"Here are the results you asked for:
```json
{
  "status": "success",
  "response": "{\"result\": {\"companies\": [{\"name\": \"Acme\", \"industry\": \"Manufacturing\"}]}}"
}
```"#;

    println!("\n[input]\n{raw}\n");

    let parsed = parse_lenient(raw).expect("demo payload parses");
    let envelope = normalize(parsed);
    println!(
        "[normalized] status={:?} result_keys={:?}",
        envelope.status,
        envelope.result.keys().collect::<Vec<_>>()
    );
    println!("[text] {:?}", extract_text(&envelope));

    match locate(&envelope.result_value(), DEFAULT_MAX_DEPTH) {
        Some(found) => println!(
            "[located] {}",
            serde_json::to_string_pretty(&found).expect("serialize")
        ),
        None => println!("[located] no domain payload found"),
    }
}
