//! Login handshake: session name and phone, then the code the backend asks
//! for, then the optional two-factor password.

use crate::error::{DashboardError, Result};
use tgdash_types::{ClientEvent, ConnectRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    Idle,
    /// `accepted` once the backend took the connect request
    Initiating { accepted: bool },
    AwaitingCode { sent: bool },
    AwaitingPassword { sent: bool },
    Connected,
    Error,
}

impl HandshakeStage {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            HandshakeStage::Initiating { .. }
                | HandshakeStage::AwaitingCode { .. }
                | HandshakeStage::AwaitingPassword { .. }
        )
    }
}

/// Input group shown below the session name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Phone,
    Code,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    SessionName,
    Phone,
    Code,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

/// Everything the connect form renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeForm {
    pub visible: bool,
    /// Stacked above the manage-sessions modal
    pub on_top: bool,
    pub session_name: String,
    pub phone: String,
    pub code: String,
    pub password: String,
    pub group: FieldGroup,
    pub session_name_enabled: bool,
    pub phone_enabled: bool,
    pub connect_enabled: bool,
    pub code_enabled: bool,
    pub password_enabled: bool,
    pub status: Option<StatusMessage>,
}

impl Default for HandshakeForm {
    fn default() -> Self {
        Self {
            visible: false,
            on_top: false,
            session_name: String::new(),
            phone: String::new(),
            code: String::new(),
            password: String::new(),
            group: FieldGroup::Phone,
            session_name_enabled: true,
            phone_enabled: true,
            connect_enabled: true,
            code_enabled: true,
            password_enabled: true,
            status: None,
        }
    }
}

impl HandshakeForm {
    /// Back to the entry layout with every control usable
    fn reset(&mut self, keep_session_name: bool) {
        let session_name = std::mem::take(&mut self.session_name);
        *self = Self {
            visible: self.visible,
            on_top: self.on_top,
            session_name: if keep_session_name {
                session_name
            } else {
                String::new()
            },
            ..Self::default()
        };
    }

    pub fn is_visible(&self, group: FieldGroup) -> bool {
        self.group == group
    }

    pub fn is_enabled(&self, field: FormField) -> bool {
        match field {
            FormField::SessionName => self.session_name_enabled,
            FormField::Phone => self.phone_enabled,
            FormField::Code => self.code_enabled,
            FormField::Password => self.password_enabled,
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn set_entry_enabled(&mut self, enabled: bool) {
        self.session_name_enabled = enabled;
        self.phone_enabled = enabled;
        self.connect_enabled = enabled;
    }

    fn show_group(&mut self, group: FieldGroup) {
        self.group = group;
        match group {
            FieldGroup::Code => {
                self.code.clear();
                self.code_enabled = true;
            }
            FieldGroup::Password => {
                self.password.clear();
                self.password_enabled = true;
            }
            FieldGroup::Phone => {}
        }
    }
}

/// The single handshake instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    stage: HandshakeStage,
    /// Bumped whenever the form is opened or closed; replies and timers
    /// tagged with an older value are ignored.
    attempt: u64,
    form: HandshakeForm,
}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            stage: HandshakeStage::Idle,
            attempt: 0,
            form: HandshakeForm::default(),
        }
    }
}

impl Handshake {
    pub fn stage(&self) -> HandshakeStage {
        self.stage
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn form(&self) -> &HandshakeForm {
        &self.form
    }

    pub fn is_visible(&self) -> bool {
        self.form.visible
    }

    /// Show a fresh form, discarding any earlier attempt
    pub fn open(&mut self, on_top: bool) -> u64 {
        self.attempt += 1;
        self.stage = HandshakeStage::Idle;
        self.form.visible = true;
        self.form.on_top = on_top;
        self.form.reset(false);
        self.attempt
    }

    pub fn close(&mut self) {
        self.attempt += 1;
        self.stage = HandshakeStage::Idle;
        self.form.visible = false;
        self.form.on_top = false;
        self.form.reset(false);
    }

    /// Typing into a disabled control has no effect
    pub fn edit(&mut self, field: FormField, value: String) {
        if !self.form.is_enabled(field) {
            return;
        }
        match field {
            FormField::SessionName => self.form.session_name = value,
            FormField::Phone => self.form.phone = value,
            FormField::Code => self.form.code = value,
            FormField::Password => self.form.password = value,
        }
    }

    /// Validate the entry fields and move to `Initiating`
    pub fn submit(&mut self) -> Result<ConnectRequest> {
        if !matches!(self.stage, HandshakeStage::Idle | HandshakeStage::Error)
            || !self.form.connect_enabled
        {
            return Err(DashboardError::Validation(
                "A connection attempt is already in progress.".to_string(),
            ));
        }

        let session_name = self.form.session_name.trim().to_string();
        if session_name.is_empty() {
            let message = "Please provide a session name.";
            self.form.set_status(message, StatusKind::Error);
            return Err(DashboardError::Validation(message.to_string()));
        }
        let phone = Some(self.form.phone.trim().to_string()).filter(|p| !p.is_empty());

        self.stage = HandshakeStage::Initiating { accepted: false };
        self.form.set_entry_enabled(false);
        self.form.set_status("Starting connection...", StatusKind::Info);

        Ok(ConnectRequest {
            session_name,
            phone,
        })
    }

    pub fn connect_accepted(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || self.stage != (HandshakeStage::Initiating { accepted: false })
        {
            return false;
        }
        self.stage = HandshakeStage::Initiating { accepted: true };
        self.form.set_status(
            "Connection started. Waiting for code/password if required...",
            StatusKind::Info,
        );
        true
    }

    pub fn connect_failed(&mut self, attempt: u64, message: String) -> bool {
        if attempt != self.attempt || !matches!(self.stage, HandshakeStage::Initiating { .. }) {
            return false;
        }
        self.stage = HandshakeStage::Error;
        self.form.set_entry_enabled(true);
        self.form.set_status(message, StatusKind::Error);
        true
    }

    /// The backend wants the login code. Shown whatever the prior state.
    pub fn ask_code(&mut self) {
        self.form.visible = true;
        self.stage = HandshakeStage::AwaitingCode { sent: false };
        self.form.show_group(FieldGroup::Code);
        self.form.set_status(
            "Please enter the login code sent to your Telegram.",
            StatusKind::Info,
        );
    }

    pub fn submit_code(&mut self) -> Result<ClientEvent> {
        if self.stage != (HandshakeStage::AwaitingCode { sent: false }) {
            return Err(DashboardError::Validation(
                "No login code was requested.".to_string(),
            ));
        }
        let code = self.form.code.trim().to_string();
        if code.is_empty() {
            let message = "Please enter the code you received.";
            self.form.set_status(message, StatusKind::Error);
            return Err(DashboardError::Validation(message.to_string()));
        }

        self.stage = HandshakeStage::AwaitingCode { sent: true };
        self.form.code_enabled = false;
        self.form.set_status("Sending code...", StatusKind::Info);
        Ok(ClientEvent::CodeResponse { code })
    }

    /// The backend wants the two-factor password
    pub fn ask_password(&mut self) {
        self.form.visible = true;
        self.stage = HandshakeStage::AwaitingPassword { sent: false };
        self.form.show_group(FieldGroup::Password);
        self.form.set_status(
            "Please enter your two-factor authentication (2FA) password.",
            StatusKind::Info,
        );
    }

    pub fn submit_password(&mut self) -> Result<ClientEvent> {
        if self.stage != (HandshakeStage::AwaitingPassword { sent: false }) {
            return Err(DashboardError::Validation(
                "No password was requested.".to_string(),
            ));
        }
        // Passwords are sent as typed
        let password = self.form.password.clone();
        if password.is_empty() {
            let message = "Please enter your 2FA password.";
            self.form.set_status(message, StatusKind::Error);
            return Err(DashboardError::Validation(message.to_string()));
        }

        self.stage = HandshakeStage::AwaitingPassword { sent: true };
        self.form.password_enabled = false;
        self.form.set_status("Sending password...", StatusKind::Info);
        Ok(ClientEvent::PasswordResponse { password })
    }

    /// An outbound challenge reply could not be delivered; let the user retry
    pub fn send_failed(&mut self, message: String) {
        match self.stage {
            HandshakeStage::AwaitingCode { sent: true } => {
                self.stage = HandshakeStage::AwaitingCode { sent: false };
                self.form.code_enabled = true;
            }
            HandshakeStage::AwaitingPassword { sent: true } => {
                self.stage = HandshakeStage::AwaitingPassword { sent: false };
                self.form.password_enabled = true;
            }
            _ => {}
        }
        self.form.set_status(message, StatusKind::Error);
    }

    /// The backend reports a live connection. Returns the attempt the close
    /// timer must carry, when the form is open.
    pub fn connected(&mut self) -> Option<u64> {
        if !self.form.visible {
            return None;
        }
        self.stage = HandshakeStage::Connected;
        self.form.set_status("Connected successfully!", StatusKind::Info);
        Some(self.attempt)
    }

    /// Close timer for `attempt` elapsed; true when the form was closed
    pub fn close_timer_fired(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || self.stage != HandshakeStage::Connected {
            return false;
        }
        self.close();
        true
    }

    /// Show a pushed error inline when the form is open. Returns false when
    /// the form is hidden and the caller should log the error instead.
    pub fn server_error(&mut self, error: &str) -> bool {
        if !self.form.visible {
            return false;
        }
        self.stage = HandshakeStage::Error;
        self.form.reset(true);
        self.form
            .set_status(format!("Error: {}", error), StatusKind::Error);
        true
    }
}
