//! Parser for the interface definition format.
//!
//! The input is a token stream of keyword and value lines. Each keyword
//! belongs to exactly one scope; structural keywords (`DEVICE`, `BLOCK`,
//! `DEFINE_ARRAY`, `VARIABLE`) change what the following pairs attach to.
//! Parsing is fatal on the first structural or validation problem because
//! a partially read definition cannot produce a correct register layout.

use std::collections::HashMap;

use ifagen_dsl::common::{
    BlockKind, Device, DocumentProperties, IfaDocument, Variable, WrapperSlot,
};
use ifagen_dsl::core::{FileId, SourceSpan};
use ifagen_dsl::diagnostic::{Diagnostic, Label};
use ifagen_problems::Problem;

use crate::token::{Keyword, Token, TokenKind};

/// Parse a tokenized interface definition into a validated document.
pub fn parse(tokens: &[Token], file_id: &FileId) -> Result<IfaDocument, Diagnostic> {
    let mut parser = DocumentParser::new(file_id);
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        index += 1;
        match &token.kind {
            TokenKind::Comment => parser.attach_comment(&token.text),
            // END_ARRAY is the only keyword without a value line.
            TokenKind::Keyword(Keyword::EndArray) => parser.end_array(token)?,
            TokenKind::Keyword(keyword) => {
                let (value, value_span) = take_value(tokens, &mut index, token, &mut parser)?;
                parser.pair(*keyword, value, value_span, token)?;
            }
            TokenKind::Value => {
                return Err(Diagnostic::problem(
                    Problem::UnknownKeyword,
                    Label::span(
                        token.span.clone(),
                        format!("The line '{}' is not a keyword", token.text),
                    ),
                )
                .with_context("keyword", &token.text));
            }
        }
    }

    parser.finish()
}

/// Takes the value line for a keyword. Comments between a keyword and its
/// value attach to the entity under construction; any other token serves
/// as the value, since names in the value position are unrestricted.
fn take_value(
    tokens: &[Token],
    index: &mut usize,
    keyword_token: &Token,
    parser: &mut DocumentParser,
) -> Result<(String, SourceSpan), Diagnostic> {
    while *index < tokens.len() {
        let token = &tokens[*index];
        *index += 1;
        match &token.kind {
            TokenKind::Comment => parser.attach_comment(&token.text),
            _ => return Ok((token.text.clone(), token.span.clone())),
        }
    }

    Err(Diagnostic::problem(
        Problem::MalformedDocument,
        Label::span(
            keyword_token.span.clone(),
            format!(
                "The document ended while a value for '{}' was still expected",
                keyword_token.text
            ),
        ),
    )
    .with_context("keyword", &keyword_token.text))
}

struct WrapperBuilder {
    array_name: String,
    next_index: u32,
}

struct VariableBuilder {
    raw: HashMap<String, String>,
    comments: Vec<String>,
    span: SourceSpan,
    block: BlockKind,
}

struct DeviceBuilder {
    raw: HashMap<String, String>,
    comments: Vec<String>,
    span: SourceSpan,
    block: Option<BlockKind>,
    wrapper: Option<WrapperBuilder>,
    variables: Vec<Variable>,
}

struct DocumentParser<'a> {
    file_id: &'a FileId,
    properties_raw: HashMap<String, String>,
    comments: Vec<String>,
    devices: Vec<Device>,
    device: Option<DeviceBuilder>,
    variable: Option<VariableBuilder>,
}

impl<'a> DocumentParser<'a> {
    fn new(file_id: &'a FileId) -> Self {
        Self {
            file_id,
            properties_raw: HashMap::new(),
            comments: vec![],
            devices: vec![],
            device: None,
            variable: None,
        }
    }

    /// Comments attach to the entity currently being built.
    fn attach_comment(&mut self, text: &str) {
        if let Some(variable) = &mut self.variable {
            variable.comments.push(text.to_string());
        } else if let Some(device) = &mut self.device {
            device.comments.push(text.to_string());
        } else {
            self.comments.push(text.to_string());
        }
    }

    /// Closes the open DEFINE_ARRAY run.
    fn end_array(&mut self, token: &Token) -> Result<(), Diagnostic> {
        self.finish_variable()?;
        match &mut self.device {
            Some(device) if device.wrapper.is_some() => {
                device.wrapper = None;
                Ok(())
            }
            _ => Err(unknown_keyword(
                Keyword::EndArray,
                token,
                "has no matching DEFINE_ARRAY",
            )),
        }
    }

    /// Handles one keyword together with its value line.
    fn pair(
        &mut self,
        keyword: Keyword,
        value: String,
        value_span: SourceSpan,
        token: &Token,
    ) -> Result<(), Diagnostic> {
        let wrapper_open = self
            .device
            .as_ref()
            .is_some_and(|device| device.wrapper.is_some());
        if wrapper_open && !keyword.valid_in_wrapper() {
            return Err(unknown_keyword(
                keyword,
                token,
                "is not permitted inside DEFINE_ARRAY",
            ));
        }

        match keyword {
            Keyword::Device => {
                self.finish_variable()?;
                self.finish_device()?;
                let mut raw = HashMap::new();
                raw.insert(keyword.as_str().to_string(), value);
                self.device = Some(DeviceBuilder {
                    raw,
                    comments: vec![],
                    span: value_span,
                    block: None,
                    wrapper: None,
                    variables: vec![],
                });
            }

            Keyword::Hash
            | Keyword::PlcType
            | Keyword::MaxIoDevices
            | Keyword::MaxLocalModules
            | Keyword::MaxModulesInIoDevice
            | Keyword::TotalEpicsToPlcLength
            | Keyword::TotalPlcToEpicsLength
            | Keyword::S7ConnectionId
            | Keyword::ModbusConnectionId => {
                if self.device.is_some() {
                    return Err(unknown_keyword(
                        keyword,
                        token,
                        "is a document property and is not permitted inside a device",
                    ));
                }
                self.properties_raw
                    .insert(keyword.as_str().to_string(), value);
            }

            Keyword::DeviceType
            | Keyword::Datablock
            | Keyword::EpicsToPlcLength
            | Keyword::EpicsToPlcDatablockOffset
            | Keyword::PlcToEpicsLength
            | Keyword::PlcToEpicsDatablockOffset => {
                self.finish_variable()?;
                let Some(device) = &mut self.device else {
                    return Err(unknown_keyword(keyword, token, "is only valid in a device"));
                };
                device.raw.insert(keyword.as_str().to_string(), value);
            }

            Keyword::Block => {
                self.finish_variable()?;
                let Some(device) = &mut self.device else {
                    return Err(unknown_keyword(keyword, token, "is only valid in a device"));
                };
                let block = BlockKind::from_name(&value).ok_or_else(|| {
                    Diagnostic::problem(
                        Problem::TypeMismatch,
                        Label::span(
                            value_span.clone(),
                            format!("The value '{}' is not a block direction", value),
                        ),
                    )
                    .with_context("property", keyword.as_str())
                })?;
                device.block = Some(block);
            }

            Keyword::DefineArray => {
                self.finish_variable()?;
                let Some(device) = &mut self.device else {
                    return Err(unknown_keyword(keyword, token, "is only valid in a device"));
                };
                device.wrapper = Some(WrapperBuilder {
                    array_name: value,
                    next_index: 1,
                });
            }

            Keyword::Variable => {
                self.finish_variable()?;
                let Some(device) = &self.device else {
                    return Err(unknown_keyword(keyword, token, "is only valid in a device"));
                };
                let Some(block) = device.block else {
                    return Err(Diagnostic::problem(
                        Problem::MalformedDocument,
                        Label::span(
                            token.span.clone(),
                            "VARIABLE was declared before any BLOCK",
                        ),
                    )
                    .with_context("keyword", keyword.as_str()));
                };
                let mut raw = HashMap::new();
                raw.insert(keyword.as_str().to_string(), value);
                self.variable = Some(VariableBuilder {
                    raw,
                    comments: vec![],
                    span: value_span,
                    block,
                });
            }

            Keyword::Epics | Keyword::Type | Keyword::ArrayIndex | Keyword::BitNumber => {
                let Some(variable) = &mut self.variable else {
                    return Err(unknown_keyword(
                        keyword,
                        token,
                        "is only valid in a VARIABLE declaration",
                    ));
                };
                variable.raw.insert(keyword.as_str().to_string(), value);
            }

            Keyword::EndArray => return self.end_array(token),
        }

        Ok(())
    }

    /// Validates and stores the variable under construction, assigning
    /// the next wrapper slot when a DEFINE_ARRAY run is open.
    fn finish_variable(&mut self) -> Result<(), Diagnostic> {
        let Some(builder) = self.variable.take() else {
            return Ok(());
        };
        let Some(device) = &mut self.device else {
            return Ok(());
        };

        let wrapper = device.wrapper.as_mut().map(|wrapper| {
            let slot = WrapperSlot {
                array_name: wrapper.array_name.clone(),
                index: wrapper.next_index,
            };
            wrapper.next_index += 1;
            slot
        });

        let variable = Variable::from_raw(
            &builder.raw,
            builder.block,
            wrapper,
            builder.comments,
            builder.span,
        )?;
        device.variables.push(variable);
        Ok(())
    }

    /// Validates and stores the device under construction.
    fn finish_device(&mut self) -> Result<(), Diagnostic> {
        let Some(builder) = self.device.take() else {
            return Ok(());
        };
        if builder.wrapper.is_some() {
            return Err(Diagnostic::problem(
                Problem::MalformedDocument,
                Label::span(
                    builder.span.clone(),
                    "DEFINE_ARRAY was not closed by END_ARRAY",
                ),
            )
            .with_context("keyword", Keyword::EndArray.as_str()));
        }

        let mut device = Device::from_raw(&builder.raw, builder.comments, builder.span)?;
        for variable in builder.variables {
            device.push_variable(variable);
        }
        self.devices.push(device);
        Ok(())
    }

    fn finish(mut self) -> Result<IfaDocument, Diagnostic> {
        self.finish_variable()?;
        self.finish_device()?;

        let span = SourceSpan::default().with_file_id(self.file_id);
        let properties = DocumentProperties::from_raw(&self.properties_raw, &span)?;

        Ok(IfaDocument {
            properties,
            devices: self.devices,
            comments: self.comments,
        })
    }
}

fn unknown_keyword(keyword: Keyword, token: &Token, why: &str) -> Diagnostic {
    Diagnostic::problem(
        Problem::UnknownKeyword,
        Label::span(
            token.span.clone(),
            format!("The keyword '{}' {}", keyword.as_str(), why),
        ),
    )
    .with_context("keyword", keyword.as_str())
}
