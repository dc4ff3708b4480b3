//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "wheredunno".to_string()
}

pub fn default_data_dir() -> String {
    "~/.wheredunno".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_provider() -> String {
    "gemini".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

pub fn default_temperature() -> f32 {
    0.7
}

pub fn default_top_k() -> u32 {
    40
}

pub fn default_top_p() -> f32 {
    0.95
}

pub fn default_max_output_tokens() -> u32 {
    1000
}

pub fn default_db_path() -> String {
    "~/.wheredunno/data/chat.db".to_string()
}

pub fn default_lookup_window() -> u32 {
    10
}

pub fn default_delay_ms() -> u64 {
    10_000
}

pub fn default_tick_ms() -> u64 {
    1_000
}

pub fn default_history_messages() -> usize {
    10
}

pub fn default_analyze_messages() -> usize {
    20
}
