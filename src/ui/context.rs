//! Terminal capability detection

use std::io::IsTerminal;

/// Environment variables that mark a CI run
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// How the CLI may talk to the user
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Both ends are a TTY and no CI marker is set
    interactive: bool,
    /// `--yes` was passed
    auto_yes: bool,
    /// Machine-readable output requested; suppress decoration
    machine: bool,
}

impl UiContext {
    pub fn detect() -> Self {
        let tty = std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
        Self {
            interactive: tty && !running_in_ci(),
            auto_yes: false,
            machine: false,
        }
    }

    /// Plain output, defaults for every prompt
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
            machine: false,
        }
    }

    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    /// Mark output as machine-readable (JSON)
    pub fn with_machine_output(mut self, machine: bool) -> Self {
        self.machine = machine;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive && !self.machine
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Spinners, bars, and cliclack framing
    pub fn use_fancy_output(&self) -> bool {
        self.is_interactive()
    }
}

fn running_in_ci() -> bool {
    CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
}
