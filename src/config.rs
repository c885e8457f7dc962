/// Settings for one interpreter run.
///
/// The CLI builds one from its arguments; tests and embedders use the
/// builder methods.
///
/// # Example
/// ```
/// use obstruct::Config;
///
/// let config = Config::default().with_args(vec!["demo.obs".into()])
///                               .with_frame_limit(Some(3));
/// assert_eq!(config.args, ["demo.obs"]);
/// assert_eq!(config.frame_limit, Some(3));
/// assert!(!config.check_only);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Arguments passed to `main`; the first is the program path.
    pub args:        Vec<String>,
    /// Number of frames after which the headless window reports itself
    /// closed. `None` keeps it open.
    pub frame_limit: Option<u64>,
    /// Stop after checking, without running the program.
    pub check_only:  bool,
}

impl Config {
    /// Sets the arguments passed to `main`.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets the headless window frame limit.
    #[must_use]
    pub const fn with_frame_limit(mut self, frame_limit: Option<u64>) -> Self {
        self.frame_limit = frame_limit;
        self
    }

    /// Sets whether the run stops after checking.
    #[must_use]
    pub const fn with_check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }
}
