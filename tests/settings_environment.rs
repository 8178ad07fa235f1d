// Kept in its own test binary: it sets a process-wide environment variable
// that every `Settings::load` in the same process would otherwise observe.
use rowmap::settings::Settings;
use rowmap::Location;

const SETTINGS: &str = r#"
database = ":memory:"

[schema]
table = "people"

[schema.columns]
first_name = "text"
"#;

#[test]
fn environment_wins_over_the_file() {
    let path = std::env::temp_dir().join(format!("rowmap_settings_env_{}.toml", std::process::id()));
    std::fs::write(&path, SETTINGS).expect("write settings");

    unsafe { std::env::set_var("ROWMAP_DATABASE", "people.db") };
    let overridden = Settings::load(&path);
    unsafe { std::env::remove_var("ROWMAP_DATABASE") };
    let _ = std::fs::remove_file(&path);

    assert_eq!(
        overridden.expect("settings").location().unwrap(),
        Location::File("people.db".into())
    );
}
