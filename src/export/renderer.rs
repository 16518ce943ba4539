use std::path::Path;

use super::error::{ExportError, ExportResult};
use super::item::NormalizedItem;
use super::naming::DerivedKind;
use crate::traits::FileSystem;

/// One `import` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlock {
    /// `<type tag>.<local identifier>`
    pub address: String,
    pub remote_id: String,
}

impl ImportBlock {
    pub fn from_item(item: &NormalizedItem) -> Self {
        Self {
            address: item.address(),
            remote_id: item.item.remote_id.clone(),
        }
    }

    /// Render as HCL
    pub fn render(&self) -> String {
        format!(
            "import {{\n  id = \"{}\"\n  to = {}\n}}",
            escape_hcl_string(&self.remote_id),
            self.address
        )
    }
}

/// Render the import document.
///
/// Blocks follow the order of `kinds`, then item order within each kind,
/// separated by a blank line. No kinds or no items yields an empty document.
pub fn render_document(kinds: &[DerivedKind]) -> String {
    let blocks: Vec<String> = kinds
        .iter()
        .flat_map(|derived| derived.items.iter())
        .map(|item| ImportBlock::from_item(item).render())
        .collect();

    if blocks.is_empty() {
        return String::new();
    }

    let mut document = blocks.join("\n\n");
    document.push('\n');
    document
}

/// Write the document to `path`, replacing any previous version in one step
pub fn write_document(fs: &dyn FileSystem, path: &Path, document: &str) -> ExportResult<()> {
    fs.write(path, document).map_err(|e| {
        ExportError::FileSystem(format!("cannot write {}: {:#}", path.display(), e))
    })
}

/// Escape a quoted HCL string. `${` and `%{` open template sequences, so
/// only those get their marker doubled.
fn escape_hcl_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::item::RawItem;
    use crate::export::naming::derive_kind;
    use crate::export::registry::ResourceKind;
    use crate::traits::MockFileSystem;
    use std::path::PathBuf;

    #[test]
    fn test_render_block() {
        let block = ImportBlock {
            address: "jamfpro_script.install_rosetta".to_string(),
            remote_id: "17".to_string(),
        };

        assert_eq!(
            block.render(),
            "import {\n  id = \"17\"\n  to = jamfpro_script.install_rosetta\n}"
        );
    }

    #[test]
    fn test_render_document_grouped_and_separated() {
        let kinds = vec![
            derive_kind(ResourceKind::Script, vec![RawItem::new("3", "Cleanup")]),
            derive_kind(
                ResourceKind::Policy,
                vec![RawItem::new("1", "Renew Cert"), RawItem::new("2", "Renew Cert")],
            ),
        ];

        let expected = "\
import {
  id = \"3\"
  to = jamfpro_script.cleanup
}

import {
  id = \"1\"
  to = jamfpro_policy.renew_cert
}

import {
  id = \"2\"
  to = jamfpro_policy.renew_cert_2
}
";
        assert_eq!(render_document(&kinds), expected);
    }

    #[test]
    fn test_render_document_empty() {
        assert_eq!(render_document(&[]), "");
        assert_eq!(
            render_document(&[derive_kind(ResourceKind::Category, vec![])]),
            ""
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let build = || {
            vec![derive_kind(
                ResourceKind::Category,
                vec![
                    RawItem::new("1", "Apps"),
                    RawItem::new("2", "apps"),
                    RawItem::new("3", ""),
                ],
            )]
        };

        assert_eq!(render_document(&build()), render_document(&build()));
    }

    #[test]
    fn test_remote_id_is_escaped() {
        let block = ImportBlock {
            address: "jamfpro_category.odd".to_string(),
            remote_id: "a\"b${c}".to_string(),
        };

        assert!(block.render().contains("id = \"a\\\"b$${c}\""));
    }

    #[test]
    fn test_lone_template_markers_are_kept() {
        assert_eq!(escape_hcl_string("a$b"), "a$b");
        assert_eq!(escape_hcl_string("100%"), "100%");
        assert_eq!(escape_hcl_string("%{if}"), "%%{if}");
        assert_eq!(escape_hcl_string("$${x}"), "$$${x}");
    }

    #[test]
    fn test_write_document() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/out/imports.hcl");

        write_document(&fs, &path, "import {}\n").unwrap();
        assert_eq!(fs.get_file_contents(&path).unwrap(), "import {}\n");
    }

    #[test]
    fn test_write_document_failure() {
        let fs = MockFileSystem::new().failing_writes();
        let path = PathBuf::from("/out/imports.hcl");

        let err = write_document(&fs, &path, "x").unwrap_err();
        assert!(matches!(err, ExportError::FileSystem(_)));
        assert!(!fs.has_file(&path));
    }
}
