//! Renders descriptors as protobuf (`proto3`) message definitions.

use std::fmt::Write;

use super::naming::upper_camel_case;
use super::schema::TableDescriptor;
use super::types::ValueKind;

const TIMESTAMP_IMPORT: &str = "google/protobuf/timestamp.proto";

/// `message UserSession { ... }` for one table, fields numbered by ordinal.
pub fn render_proto_message(table: &TableDescriptor) -> String {
    let mut out = String::new();

    if let Some(comment) = table.comment() {
        let _ = writeln!(out, "// {}", comment);
    }
    let _ = writeln!(out, "message {} {{", upper_camel_case(table.name()));
    for column in table.columns() {
        let label = if column.is_array {
            "repeated "
        } else if column.is_nullable {
            "optional "
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {}{} {} = {};",
            label, column.proto_type, column.proto_name, column.proto_number
        );
    }
    out.push_str("}\n");
    out
}

/// A complete `.proto` file holding one message per table.
pub fn render_proto_file<'a, I>(tables: I, package: &str) -> String
where
    I: IntoIterator<Item = &'a TableDescriptor>,
{
    let tables: Vec<&TableDescriptor> = tables.into_iter().collect();
    let needs_timestamp = tables
        .iter()
        .flat_map(|t| t.columns())
        .any(|c| c.kind == ValueKind::Timestamp);

    let mut out = String::from("syntax = \"proto3\";\n\n");
    let _ = writeln!(out, "package {};\n", package);
    if needs_timestamp {
        let _ = writeln!(out, "import \"{}\";\n", TIMESTAMP_IMPORT);
    }

    let messages: Vec<String> = tables.into_iter().map(render_proto_message).collect();
    out.push_str(&messages.join("\n"));
    out
}
