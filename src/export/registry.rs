//! Resource Kind Registry
//!
//! The closed set of Jamf Pro object kinds this tool can export. Each kind
//! carries its selection key, the `jamfpro` provider resource type it is
//! imported as, and the API operation that lists it. Declaration order is the
//! grouping order of the rendered import document.

use serde::Serialize;

use super::selection::Selection;

/// Supported Jamf Pro resource kinds, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Script,
    Category,
    Policy,
    MacosConfigurationProfilePlist,
    StaticComputerGroup,
    SmartComputerGroup,
    AdvancedComputerSearch,
    ComputerExtensionAttribute,
}

/// How a resource kind is listed from the tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOperation {
    /// Jamf Pro API endpoint returning a paged `{ totalCount, results }` envelope
    Paged { path: &'static str },
    /// Classic API endpoint returning `{ <collection>: [...] }`
    Classic {
        path: &'static str,
        collection: &'static str,
    },
    /// Classic computer groups, split on the `is_smart` flag
    ComputerGroups { smart: bool },
}

impl ResourceKind {
    /// Key used in the selection document
    pub fn selection_key(&self) -> &'static str {
        match self {
            ResourceKind::Script => "script",
            ResourceKind::Category => "category",
            ResourceKind::Policy => "policy",
            ResourceKind::MacosConfigurationProfilePlist => "macos_configuration_profile_plist",
            ResourceKind::StaticComputerGroup => "static_computer_group",
            ResourceKind::SmartComputerGroup => "smart_computer_group",
            ResourceKind::AdvancedComputerSearch => "advanced_computer_search",
            ResourceKind::ComputerExtensionAttribute => "computer_extension_attribute",
        }
    }

    /// Terraform/OpenTofu resource type the kind is imported as
    pub fn type_tag(&self) -> &'static str {
        match self {
            ResourceKind::Script => "jamfpro_script",
            ResourceKind::Category => "jamfpro_category",
            ResourceKind::Policy => "jamfpro_policy",
            ResourceKind::MacosConfigurationProfilePlist => {
                "jamfpro_macos_configuration_profile_plist"
            }
            ResourceKind::StaticComputerGroup => "jamfpro_static_computer_group",
            ResourceKind::SmartComputerGroup => "jamfpro_smart_computer_group",
            ResourceKind::AdvancedComputerSearch => "jamfpro_advanced_computer_search",
            ResourceKind::ComputerExtensionAttribute => "jamfpro_computer_extension_attribute",
        }
    }

    /// API operation used to list every object of this kind
    pub fn operation(&self) -> FetchOperation {
        match self {
            ResourceKind::Script => FetchOperation::Paged {
                path: "/api/v1/scripts",
            },
            ResourceKind::Category => FetchOperation::Paged {
                path: "/api/v1/categories",
            },
            ResourceKind::Policy => FetchOperation::Classic {
                path: "/JSSResource/policies",
                collection: "policies",
            },
            ResourceKind::MacosConfigurationProfilePlist => FetchOperation::Classic {
                path: "/JSSResource/osxconfigurationprofiles",
                collection: "os_x_configuration_profiles",
            },
            ResourceKind::StaticComputerGroup => FetchOperation::ComputerGroups { smart: false },
            ResourceKind::SmartComputerGroup => FetchOperation::ComputerGroups { smart: true },
            ResourceKind::AdvancedComputerSearch => FetchOperation::Classic {
                path: "/JSSResource/advancedcomputersearches",
                collection: "advanced_computer_searches",
            },
            ResourceKind::ComputerExtensionAttribute => FetchOperation::Classic {
                path: "/JSSResource/computerextensionattributes",
                collection: "computer_extension_attributes",
            },
        }
    }

    /// Parse a kind from its selection key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.selection_key() == key)
    }

    /// Every registered kind, in declaration order
    pub fn all() -> Vec<ResourceKind> {
        vec![
            ResourceKind::Script,
            ResourceKind::Category,
            ResourceKind::Policy,
            ResourceKind::MacosConfigurationProfilePlist,
            ResourceKind::StaticComputerGroup,
            ResourceKind::SmartComputerGroup,
            ResourceKind::AdvancedComputerSearch,
            ResourceKind::ComputerExtensionAttribute,
        ]
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.selection_key())
    }
}

/// Kinds enabled by a selection document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedKinds {
    /// Enabled kinds in registry order
    pub kinds: Vec<ResourceKind>,
    /// Keys present in the selection that the registry does not know (sorted)
    pub unknown_keys: Vec<String>,
}

/// Resolve a selection against the registry.
///
/// Missing keys count as disabled. Unknown keys never abort the run; they are
/// returned so the caller can warn about them.
pub fn enabled_kinds(selection: &Selection) -> SelectedKinds {
    let kinds = ResourceKind::all()
        .into_iter()
        .filter(|kind| selection.is_enabled(kind.selection_key()))
        .collect();

    let unknown_keys = selection
        .keys()
        .filter(|key| ResourceKind::from_key(key).is_none())
        .map(str::to_string)
        .collect();

    SelectedKinds {
        kinds,
        unknown_keys,
    }
}
