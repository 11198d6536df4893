use shared_types::LoginAttempt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for input; `failed` shows the "Login failed" indicator.
    Idle { failed: bool },
    /// An attempt was emitted and the orchestrator has not answered yet.
    Submitting,
}

/// Username/password form. Never touches the remote store.
#[derive(Debug, Clone)]
pub struct LoginView {
    state: LoginState,
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginViewModel {
    pub username: String,
    pub password: String,
    pub failed: bool,
    pub in_progress: bool,
    pub submit_enabled: bool,
}

impl Default for LoginView {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginView {
    pub fn new() -> Self {
        Self {
            state: LoginState::Idle { failed: false },
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Emit a login attempt with the current field values.
    ///
    /// Returns `None` while a previous attempt is still unanswered.
    pub fn submit(&mut self) -> Option<LoginAttempt> {
        if self.state == LoginState::Submitting {
            return None;
        }
        self.state = LoginState::Submitting;
        Some(LoginAttempt {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    /// Called by the orchestrator when the credential probe failed.
    pub fn login_failed(&mut self) {
        self.state = LoginState::Idle { failed: true };
    }

    pub fn view_model(&self) -> LoginViewModel {
        LoginViewModel {
            username: self.username.clone(),
            password: self.password.clone(),
            failed: matches!(self.state, LoginState::Idle { failed: true }),
            in_progress: self.state == LoginState::Submitting,
            submit_enabled: self.state != LoginState::Submitting,
        }
    }
}
