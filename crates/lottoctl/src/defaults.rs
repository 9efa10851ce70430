pub(crate) const DEFAULT_LOTTOSYNC_HOME: &str = ".lottosync";

pub fn default_home_dir() -> camino::Utf8PathBuf {
    if let Some(home) = dirs::home_dir() {
        if let Some(home) = camino::Utf8Path::from_path(&home) {
            return home.join(DEFAULT_LOTTOSYNC_HOME);
        }
    }

    Default::default()
}
