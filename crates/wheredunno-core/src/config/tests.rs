use super::*;

#[test]
fn test_empty_config_uses_defaults() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.wheredunno.data_dir, "~/.wheredunno");
    assert_eq!(cfg.provider.default, "gemini");
    assert!(cfg.provider.gemini.is_none());
    assert_eq!(cfg.memory.lookup_window, 10);
    assert!(cfg.responder.enabled);
    assert_eq!(cfg.responder.delay_ms, 10_000);
    assert_eq!(cfg.responder.tick_ms, 1_000);
    assert_eq!(cfg.assistant.history_messages, 10);
    assert_eq!(cfg.assistant.analyze_messages, 20);
}

#[test]
fn test_gemini_config_from_toml() {
    let toml_str = r#"
        [provider]
        default = "gemini"

        [provider.gemini]
        api_key = "AIza-test"
        temperature = 0.2
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    let gc = cfg.provider.gemini.unwrap();
    assert_eq!(gc.api_key, "AIza-test");
    assert_eq!(gc.model, "gemini-1.5-flash");
    assert!((gc.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(gc.top_k, 40);
    assert_eq!(gc.max_output_tokens, 1000);
}

#[test]
fn test_apply_env_fills_empty_key_only() {
    let mut pc = ProviderConfig::default();
    pc.apply_env(Some("from-env".into()));
    assert_eq!(pc.gemini.as_ref().unwrap().api_key, "from-env");

    pc.apply_env(Some("other".into()));
    assert_eq!(pc.gemini.as_ref().unwrap().api_key, "from-env");

    let mut untouched = ProviderConfig::default();
    untouched.apply_env(Some("  ".into()));
    untouched.apply_env(None);
    assert!(untouched.gemini.is_none());
}

#[test]
fn test_identity_config_resolution() {
    let cfg: Config = toml::from_str(
        r#"
        [identity]
        user_id = "u-42"
        email = "siti@example.com"
    "#,
    )
    .unwrap();
    let id = cfg.identity.identity();
    assert_eq!(id.user_id, "u-42");
    assert_eq!(id.user_name, "siti");

    assert_eq!(IdentityConfig::default().identity(), Identity::anonymous());
}

#[test]
fn test_load_missing_file_falls_back() {
    let cfg = load("/nonexistent/__wheredunno_test__/config.toml").unwrap();
    assert!(cfg.provider.gemini.is_some());
    assert_eq!(cfg.memory.db_path, "~/.wheredunno/data/chat.db");
}

#[test]
fn test_load_rejects_malformed_file() {
    let tmp = std::env::temp_dir().join("__wheredunno_test_bad_config__.toml");
    std::fs::write(&tmp, "[responder\ndelay_ms = ").unwrap();
    let err = load(tmp.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, WhereError::Config(_)));
    let _ = std::fs::remove_file(&tmp);
}

#[test]
fn test_prompts_from_markdown_overrides_sections() {
    let md = "## System\nBe brief.\n\n## Analyze Brief\nQ: {question}\n{context}\n";
    let prompts = Prompts::from_markdown(md);
    assert_eq!(prompts.system, "Be brief.");
    assert_eq!(prompts.analyze_brief, "Q: {question}\n{context}");
    assert_eq!(prompts.analyze, Prompts::default().analyze);
}

#[test]
fn test_bundled_prompt_has_whereabouts_rules() {
    let prompts = Prompts::from_markdown(include_str!("../../../../prompts/SYSTEM_PROMPT.md"));
    assert!(prompts.system.contains("tung tung tung sahur"));
    assert!(prompts.system.contains("TRACKING USER WHEREABOUTS"));
    assert!(prompts.analyze.contains("{context}"));
    assert!(prompts.analyze_brief.contains("{question}"));
}

#[test]
fn test_render_analyze() {
    let out = Prompts::render_analyze("Q={question} C={context}", "ali: hi", "who?");
    assert_eq!(out, "Q=who? C=ali: hi");
}

#[test]
fn test_install_bundled_prompts_does_not_overwrite() {
    let tmp = std::env::temp_dir().join("__wheredunno_test_bundled_prompts__");
    let _ = std::fs::remove_dir_all(&tmp);

    install_bundled_prompts(tmp.to_str().unwrap());
    let prompt_path = tmp.join("prompts/SYSTEM_PROMPT.md");
    assert!(prompt_path.exists(), "SYSTEM_PROMPT.md should be deployed");

    std::fs::write(&prompt_path, "custom prompt").unwrap();
    install_bundled_prompts(tmp.to_str().unwrap());
    assert_eq!(
        std::fs::read_to_string(&prompt_path).unwrap(),
        "custom prompt",
        "should not overwrite user edits to SYSTEM_PROMPT.md"
    );

    let _ = std::fs::remove_dir_all(&tmp);
}
