//! Browser fingerprint evasion.
//!
//! A fixed set of launch flags, a static desktop user agent, and init scripts
//! run before any page script to hide the usual automation tells.

/// User agent presented by every rendered session.
pub const STEALTH_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/65.0.3312.0 Safari/537.36";

/// Chrome flags applied at launch, excluding the user agent.
pub const STEALTH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-infobars",
    "--window-position=0,0",
    "--ignore-certificate-errors",
    "--ignore-certificate-errors-spki-list",
    "--disable-blink-features=AutomationControlled",
];

/// Scripts registered with `Page.addScriptToEvaluateOnNewDocument`.
pub const EVASION_SCRIPTS: &[&str] = &[
    // navigator.webdriver
    r#"Object.defineProperty(navigator, 'webdriver', { get: () => undefined, configurable: true });"#,
    // window.chrome
    r#"if (!window.chrome) { window.chrome = { runtime: {}, loadTimes: function() {}, csi: function() {}, app: {} }; }"#,
    // navigator.languages
    r#"Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'], configurable: true });"#,
    // navigator.plugins
    r#"Object.defineProperty(navigator, 'plugins', {
        get: () => [
            { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
            { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai', description: '' },
            { name: 'Native Client', filename: 'internal-nacl-plugin', description: '' }
        ],
        configurable: true
    });"#,
    // permissions.query for notifications
    r#"if (window.navigator.permissions) {
        const originalQuery = window.navigator.permissions.query;
        window.navigator.permissions.query = (parameters) => (
            parameters.name === 'notifications'
                ? Promise.resolve({ state: Notification.permission })
                : originalQuery(parameters)
        );
    }"#,
];

/// Full launch argument list: the stealth flags plus the spoofed user agent.
pub fn launch_args() -> Vec<String> {
    STEALTH_ARGS
        .iter()
        .map(|arg| arg.to_string())
        .chain(std::iter::once(format!("--user-agent={STEALTH_USER_AGENT}")))
        .collect()
}
