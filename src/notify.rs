use notify_rust::Notification;

/// Send a desktop notification. Best-effort: the monitor must keep
/// working on systems without a notification daemon, so failures are
/// swallowed.
pub fn notify(summary: &str, body: &str, icon: &str) {
    let _ = Notification::new()
        .summary(summary)
        .body(body)
        .icon(icon)
        .show();
}
