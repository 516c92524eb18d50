//! Staging repository lookup.
//!
//! Each staged monitor has an XML descriptor `<name>.xml` whose top-level
//! `agent` element names the agent the monitor belongs to. Several environments
//! keep their staging area in different directories; the first candidate that
//! exists on this host is used.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeployError, Result};

const AGENT_ELEMENT: &[u8] = b"agent";

#[derive(Debug, Clone)]
pub struct StagingRepo {
    candidates: Vec<PathBuf>,
}

impl StagingRepo {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// First candidate directory that exists
    pub fn locate(&self) -> Result<&Path> {
        self.candidates
            .iter()
            .find(|path| path.is_dir())
            .map(PathBuf::as_path)
            .ok_or_else(|| DeployError::StagingNotFound {
                searched: self
                    .candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Path of the descriptor for `monitor` in the located staging directory
    pub fn descriptor_path(&self, monitor: &str) -> Result<PathBuf> {
        Ok(self.locate()?.join(format!("{monitor}.xml")))
    }

    /// Agent named by the monitor's staged descriptor
    pub fn agent_for(&self, monitor: &str) -> Result<String> {
        let path = self.descriptor_path(monitor)?;
        let content = fs::read_to_string(&path).map_err(|e| DeployError::Descriptor {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        match read_agent_element(&content) {
            Ok(Some(agent)) => Ok(agent),
            Ok(None) => Err(DeployError::DescriptorMissing { path }),
            Err(reason) => Err(DeployError::Descriptor { path, reason }),
        }
    }
}

/// Text of the `agent` element directly under the document root.
///
/// Returns `Ok(None)` when the element is absent or empty.
fn read_agent_element(xml: &str) -> std::result::Result<Option<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut in_agent = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if depth == 2 && e.local_name().as_ref() == AGENT_ELEMENT {
                    in_agent = true;
                }
            }
            Ok(Event::End(_)) => {
                if in_agent && depth == 2 {
                    let agent = text.trim();
                    return Ok((!agent.is_empty()).then(|| agent.to_string()));
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(t)) if in_agent => {
                let value = t.unescape().map_err(|e| e.to_string())?;
                text.push_str(&value);
            }
            Ok(Event::CData(t)) if in_agent => {
                text.push_str(&String::from_utf8_lossy(&t));
            }
            Ok(Event::Eof) => {
                if depth != 0 {
                    return Err("unexpected end of document".to_string());
                }
                return Ok(None);
            }
            Err(e) => {
                return Err(format!(
                    "error at position {}: {e}",
                    reader.error_position()
                ))
            }
            _ => {}
        }
    }
}
