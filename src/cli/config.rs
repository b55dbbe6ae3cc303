use crate::error::{Result, TallyError};
use crate::settings::{
    load_settings, save_settings, settings_path, try_load_settings, API_KEY_ENV,
};

pub fn set_api(
    endpoint: Option<String>,
    model: Option<String>,
    key: Option<String>,
    timeout: Option<u64>,
) -> Result<()> {
    let mut settings = try_load_settings()?;
    if let Some(endpoint) = endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(TallyError::InvalidInput(format!(
                "endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        settings.vision.endpoint = endpoint;
    }
    if let Some(model) = model {
        settings.vision.model = model;
    }
    if let Some(key) = key {
        settings.vision.api_key = Some(key).filter(|k| !k.trim().is_empty());
    }
    if let Some(timeout) = timeout {
        if timeout == 0 {
            return Err(TallyError::InvalidInput("timeout must be at least 1 second".into()));
        }
        settings.vision.timeout_secs = timeout;
    }
    save_settings(&settings)?;
    println!("Saved API settings to {}", settings_path().display());
    Ok(())
}

pub fn show() -> Result<()> {
    let settings = load_settings();
    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", settings.data_dir);
    println!("Endpoint:   {}", settings.vision.endpoint);
    println!("Model:      {}", settings.vision.model);
    println!("Timeout:    {}s", settings.vision.timeout_secs);
    let key_source = if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
        format!("from {API_KEY_ENV}")
    } else if settings.vision.api_key.is_some() {
        "stored".to_string()
    } else {
        "(not set)".to_string()
    };
    println!("API key:    {key_source}");
    Ok(())
}
