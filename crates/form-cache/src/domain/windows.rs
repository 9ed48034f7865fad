//! Built-in Bedrock form windows.
//!
//! Only the two kinds with scalar replies live here. Clients answer a modal
//! form with `true`/`false` and a simple form with the clicked button index;
//! either may answer `null` when the player closes the window.

use crate::domain::form::{malformed, Form, FormType};
use crate::domain::RequestId;
use crate::error::FormResult;
use serde::{Deserialize, Serialize};

/// Two-button dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalForm {
    #[serde(rename = "type")]
    form_type: FormType,
    pub title: String,
    pub content: String,
    pub button1: String,
    pub button2: String,
}

impl ModalForm {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        button1: impl Into<String>,
        button2: impl Into<String>,
    ) -> Self {
        Self {
            form_type: FormType::Modal,
            title: title.into(),
            content: content.into(),
            button1: button1.into(),
            button2: button2.into(),
        }
    }
}

/// Reply to a [`ModalForm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalResponse {
    /// Window closed without choosing
    Closed,
    /// `button1` pressed
    Accepted,
    /// `button2` pressed
    Declined,
}

impl Form for ModalForm {
    type Response = ModalResponse;

    fn form_type(&self) -> FormType {
        FormType::Modal
    }

    fn json_data(&self) -> FormResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn parse_response(&self, id: RequestId, raw: &str) -> FormResult<ModalResponse> {
        let value: Option<bool> = serde_json::from_str(raw.trim())
            .map_err(|e| malformed(id, format!("expected true, false or null: {}", e)))?;
        Ok(match value {
            None => ModalResponse::Closed,
            Some(true) => ModalResponse::Accepted,
            Some(false) => ModalResponse::Declined,
        })
    }
}

/// Image shown on a [`FormButton`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ButtonImage {
    /// Resource pack path
    Path(String),
    /// Remote URL
    Url(String),
}

/// Button in a [`SimpleForm`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<ButtonImage>,
}

impl FormButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ButtonImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Button list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleForm {
    #[serde(rename = "type")]
    form_type: FormType,
    pub title: String,
    pub content: String,
    pub buttons: Vec<FormButton>,
}

impl SimpleForm {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            form_type: FormType::Simple,
            title: title.into(),
            content: content.into(),
            buttons: Vec::new(),
        }
    }

    pub fn button(mut self, button: FormButton) -> Self {
        self.buttons.push(button);
        self
    }
}

/// Reply to a [`SimpleForm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleResponse {
    /// Window closed without choosing
    Closed,
    /// Index into [`SimpleForm::buttons`]
    Clicked(usize),
}

impl Form for SimpleForm {
    type Response = SimpleResponse;

    fn form_type(&self) -> FormType {
        FormType::Simple
    }

    fn json_data(&self) -> FormResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn parse_response(&self, id: RequestId, raw: &str) -> FormResult<SimpleResponse> {
        let value: Option<usize> = serde_json::from_str(raw.trim())
            .map_err(|e| malformed(id, format!("expected button index or null: {}", e)))?;
        match value {
            None => Ok(SimpleResponse::Closed),
            Some(index) if index < self.buttons.len() => Ok(SimpleResponse::Clicked(index)),
            Some(index) => Err(malformed(
                id,
                format!("button {} out of range ({} buttons)", index, self.buttons.len()),
            )),
        }
    }
}
