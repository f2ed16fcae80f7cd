use std::{io::Write, sync::Mutex};

use log::warn;

use crate::{LookupPresenter, Profile, Repository};

/// The avatar shown when a profile has none.
const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/120?text=?";

/// A presenter rendering lookup states as text.
pub struct TerminalPresenter<W: Write + Send> {
    output: Mutex<W>,
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Creates a new `TerminalPresenter` writing to the given output.
    pub fn new(output: W) -> Self {
        Self {
            output: Mutex::new(output),
        }
    }

    fn write(&self, text: &str) {
        let Ok(mut output) = self.output.lock() else {
            warn!("Terminal output is poisoned, dropping: {text}");
            return;
        };
        if let Err(e) = writeln!(output, "{text}").and_then(|_| output.flush()) {
            warn!("Failed to write to terminal: {e}");
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output.into_inner().unwrap()
    }
}

fn language_label(repository: &Repository) -> &str {
    repository.language.as_deref().unwrap_or("—")
}

impl<W: Write + Send> LookupPresenter for TerminalPresenter<W> {
    fn show_loading(&self) {
        self.write("⏳ fetching ...");
    }

    fn show_profile(&self, profile: &Profile) {
        self.write(&format!(
            "👤 {} (@{})\n   {}\n   avatar: {}\n   followers: {} · following: {} · repos: {}",
            profile.display_name(),
            profile.login,
            profile.bio.as_deref().unwrap_or("no bio"),
            profile.avatar_url.as_deref().unwrap_or(PLACEHOLDER_AVATAR),
            profile.followers,
            profile.following,
            profile.public_repos
        ));
    }

    fn show_repos(&self, repositories: &[Repository]) {
        let plural = if repositories.len() > 1 { "s" } else { "" };
        let mut lines = vec![format!("{} repo{plural}", repositories.len())];
        lines.extend(repositories.iter().enumerate().map(|(index, repository)| {
            format!(
                "  [{}] {}  ⭐ {}  🔗 {}  {}",
                index + 1,
                repository.name,
                repository.stargazers_count,
                repository.forks_count,
                language_label(repository)
            )
        }));
        self.write(&lines.join("\n"));
    }

    fn show_empty(&self, message: &str) {
        self.write(&format!("📁 {message}"));
    }

    fn show_error(&self, message: &str) {
        self.write(&format!("❌ {message}"));
    }

    fn show_detail(&self, repository: &Repository) {
        self.write(&format!(
            "┌ {}\n│ {}\n│ ⭐ {} stars  🔀 {} forks  🔤 {}\n│ open on github: {}\n└ (:close, :escape or :outside to dismiss)",
            repository.name,
            repository
                .description
                .as_deref()
                .unwrap_or("no description provided"),
            repository.stargazers_count,
            repository.forks_count,
            language_label(repository),
            repository.html_url
        ));
    }

    fn hide_detail(&self) {
        self.write("(detail closed)");
    }
}
