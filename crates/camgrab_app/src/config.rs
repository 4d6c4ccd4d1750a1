use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use camgrab_core::{GrabSettings, SaveTemplate};
use engine_logging::engine_info;

use crate::cli::Args;

pub fn load_settings_file(path: &Path) -> anyhow::Result<GrabSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let settings: GrabSettings = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    engine_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// File settings (or defaults), overridden by whatever flags were given.
pub fn resolve_settings(args: &Args) -> anyhow::Result<GrabSettings> {
    let mut settings = match &args.config {
        Some(path) => load_settings_file(path)?,
        None => GrabSettings::default(),
    };

    if let Some(url) = args.target_url() {
        settings.url = url.to_string();
    }
    if settings.url.is_empty() {
        bail!("no url given; pass one on the command line or in the config file");
    }
    if let Some(every) = args.every {
        settings.every = every;
    }
    if args.no_save {
        settings.save_dir = None;
    } else if let Some(dir) = &args.save_dir {
        settings.save_dir = Some(dir.clone());
    }
    if let Some(template) = &args.filename {
        settings.save_filename = SaveTemplate::new(template.clone());
    }
    if let Some(timeout) = args.timeout {
        settings.timeout = timeout;
    }
    for code in &args.ignore {
        settings.policy.set_ignore(*code, true);
    }
    for code in &args.no_ignore {
        settings.policy.set_ignore(*code, false);
    }
    if args.no_ignore_timeout {
        settings.policy.set_ignore_timeout(false);
    }
    if args.count.is_some() {
        settings.max_ticks = args.count;
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use tempfile::TempDir;

    fn args(url: &str) -> Args {
        Args {
            url: Some(url.to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn defaults_apply_without_flags() {
        let settings = resolve_settings(&args("http://cam/out.jpg")).unwrap();
        assert_eq!(settings.interval(), Duration::from_secs(2));
        assert_eq!(settings.save_dir, Some(PathBuf::from("grabbed_images")));
        assert!(settings.policy.is_ignored(503));
    }

    #[test]
    fn flags_override_policy_and_saving() {
        let args = Args {
            no_save: true,
            ignore: vec![404],
            no_ignore: vec![503],
            no_ignore_timeout: true,
            every: Some(0.5),
            count: Some(4),
            ..args("http://cam/out.jpg")
        };
        let settings = resolve_settings(&args).unwrap();

        assert!(!settings.saving_enabled());
        assert!(settings.policy.is_ignored(404));
        assert!(!settings.policy.is_ignored(503));
        assert!(!settings.policy.ignore_timeout);
        assert_eq!(settings.interval(), Duration::from_millis(500));
        assert_eq!(settings.max_ticks, Some(4));
    }

    #[test]
    fn config_file_is_overridden_by_flags() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cam.ron");
        fs::write(
            &path,
            r#"(url: "http://file/out.jpg", every: 10.0, save_dir: Some("snaps"))"#,
        )
        .unwrap();

        let from_file = resolve_settings(&Args {
            config: Some(path.clone()),
            ..Args::default()
        })
        .unwrap();
        assert_eq!(from_file.url, "http://file/out.jpg");
        assert_eq!(from_file.save_dir, Some(PathBuf::from("snaps")));

        let overridden = resolve_settings(&Args {
            config: Some(path),
            every: Some(1.0),
            ..args("http://flag/out.jpg")
        })
        .unwrap();
        assert_eq!(overridden.url, "http://flag/out.jpg");
        assert_eq!(overridden.interval(), Duration::from_secs(1));
    }

    #[test]
    fn url_flag_overrides_config_file() {
        let args = Args {
            url_flag: Some("http://flag/snap.jpg".to_string()),
            ..Args::default()
        };
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.url, "http://flag/snap.jpg");
    }

    #[test]
    fn missing_url_is_an_error() {
        assert!(resolve_settings(&Args::default()).is_err());
    }

    #[test]
    fn negative_every_is_rejected() {
        let args = Args {
            every: Some(-2.0),
            ..args("http://cam/out.jpg")
        };
        assert!(resolve_settings(&args).is_err());
    }
}
