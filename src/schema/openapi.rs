use crate::odf::descriptor::VarKind;
use crate::schema::{combined_description, TemplateSchema, VarSpec};
use serde_json::{json, Map, Value};

/// Builds the Swagger 2.0 document for one template as a deterministic
/// JSON value. The header is always included.
pub fn document(schema: &TemplateSchema, endpoint: &str, host: &str) -> Value {
    json!({
        "swagger": "2.0",
        "info": {
            "version": "v1",
            "title": "ODF report API",
            "description": "Apply the data in JSON format to the template and output it as an Open Document Format file."
        },
        "host": host,
        "paths": paths(schema, endpoint),
        "schemes": ["http", "https"],
        "parameters": {
            "outputPDF": {
                "in": "query",
                "name": "outputPDF",
                "required": false,
                "type": "boolean",
                "allowEmptyValue": true,
                "description": "Output to PDF format."
            }
        }
    })
}

fn paths(schema: &TemplateSchema, endpoint: &str) -> Value {
    let mut paths = Map::new();
    paths.insert(
        format!("/odf-report/{endpoint}/accessTimes"),
        json!({
            "get": {
                "consumes": ["application/json"],
                "responses": {
                    "200": {
                        "description": "Success",
                        "schema": {
                            "type": "object",
                            "properties": {
                                "call_times": {
                                    "type": "integer",
                                    "description": "Number of calls."
                                }
                            }
                        }
                    },
                    "404": { "description": "No such template" }
                }
            }
        }),
    );
    paths.insert(
        format!("/odf-report/{endpoint}"),
        json!({
            "post": {
                "consumes": ["multipart/form-data", "application/json"],
                "parameters": [
                    { "$ref": "#/parameters/outputPDF" },
                    {
                        "in": "body",
                        "name": "body",
                        "description": "",
                        "required": true,
                        "schema": {
                            "type": "object",
                            "properties": properties(schema)
                        }
                    }
                ],
                "responses": {
                    "200": { "description": "Success" },
                    "400": { "description": "Malformed JSON or form payload" },
                    "404": { "description": "No such template" },
                    "500": { "description": "Merge or PDF conversion failed" }
                }
            }
        }),
    );
    Value::Object(paths)
}

fn properties(schema: &TemplateSchema) -> Value {
    let mut props = Map::new();
    for var in &schema.singles {
        props.insert(var.name.clone(), property(var));
    }
    for group in &schema.groups {
        let mut inner = Map::new();
        for var in &group.vars {
            inner.insert(var.name.clone(), property(var));
        }
        props.insert(
            group.name.clone(),
            json!({
                "type": "array",
                "xml": { "name": group.name, "wrapped": true },
                "items": { "type": "object", "properties": inner }
            }),
        );
    }
    Value::Object(props)
}

fn property(var: &VarSpec) -> Value {
    let descriptor = &var.descriptor;
    let mut prop = Map::new();
    prop.insert("type".to_string(), json!(descriptor.kind.json_type()));
    if descriptor.kind == VarKind::Enum && !descriptor.items.is_empty() {
        prop.insert("enum".to_string(), json!(descriptor.items_labels()));
    }
    let description = combined_description(descriptor);
    if !description.is_empty() {
        prop.insert("description".to_string(), json!(description));
    }
    if !descriptor.format.is_empty() {
        prop.insert("format".to_string(), json!(descriptor.format.replace('"', "")));
    }
    if descriptor.kind == VarKind::File {
        prop.insert(
            "items".to_string(),
            json!({ "type": "string", "format": "binary" }),
        );
    }
    Value::Object(prop)
}
