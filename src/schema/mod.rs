pub mod openapi;
pub mod sample;
pub mod yaml;

use crate::odf::descriptor::Descriptor;
use crate::odf::scanner::{self, VarScan};
use crate::odf::xml::XmlDoc;
use crate::odf::DocKind;

/// Which description of a template's implied API to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescribeKind {
    OpenApi,
    Sample,
    Yaml,
}

#[derive(Debug, Clone)]
pub struct VarSpec {
    pub name: String,
    pub descriptor: Descriptor,
}

#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub name: String,
    pub vars: Vec<VarSpec>,
}

/// The variables of one template, deduplicated for description: first
/// occurrence wins, singles and groups are separate scopes, and every
/// group is keyed by its (unique) group name.
#[derive(Debug, Clone)]
pub struct TemplateSchema {
    pub singles: Vec<VarSpec>,
    pub groups: Vec<GroupSpec>,
}

impl TemplateSchema {
    pub fn collect(doc: &XmlDoc, kind: DocKind, scan: &VarScan) -> Self {
        let mut singles: Vec<VarSpec> = Vec::new();
        for &placeholder in &scan.singles {
            let name = scanner::var_name(doc, kind, placeholder);
            if singles.iter().any(|v| v.name == name) {
                continue;
            }
            let descriptor =
                Descriptor::parse(doc.attr(placeholder, kind.descriptor_attr()).unwrap_or(""));
            singles.push(VarSpec { name, descriptor });
        }

        let mut groups: Vec<GroupSpec> = Vec::new();
        for &anchor in &scan.groups {
            let group_name = doc.attr(anchor, "grpname").unwrap_or("").to_string();
            if groups.iter().any(|g| g.name == group_name) {
                continue;
            }
            let mut vars: Vec<VarSpec> = Vec::new();
            for placeholder in doc.descendants_named(anchor, kind.placeholder_tag()) {
                let name = scanner::var_name(doc, kind, placeholder);
                if vars.iter().any(|v| v.name == name) {
                    continue;
                }
                let descriptor = Descriptor::parse(
                    doc.attr(placeholder, kind.descriptor_attr()).unwrap_or(""),
                );
                vars.push(VarSpec { name, descriptor });
            }
            groups.push(GroupSpec {
                name: group_name,
                vars,
            });
        }

        Self { singles, groups }
    }
}

pub fn describe(schema: &TemplateSchema, kind: DescribeKind, endpoint: &str, host: &str) -> String {
    match kind {
        DescribeKind::OpenApi => {
            let doc = openapi::document(schema, endpoint, host);
            serde_json::to_string_pretty(&doc).unwrap_or_default()
        }
        DescribeKind::Sample => sample::emit(schema),
        DescribeKind::Yaml => yaml::emit(&openapi::document(schema, endpoint, host)),
    }
}

/// `ApiHelp` and `Description` joined with ` / `; quotes stripped and
/// newlines turned into HTML breaks so the text survives both carriers.
pub(crate) fn combined_description(descriptor: &Descriptor) -> String {
    let description = descriptor
        .description
        .replace('"', "")
        .replace('\n', "<br />");
    let help = descriptor.api_help.clone();
    match (help.is_empty(), description.is_empty()) {
        (false, false) => format!("{help} / {description}"),
        (false, true) => help,
        (true, false) => description,
        (true, true) => String::new(),
    }
}
