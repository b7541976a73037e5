//! Enterprise job-profile export (SOAP `Submit_Job_Profile_Request` document).
//!
//! Every non-empty field becomes `<Label>: <text>`, joined by blank lines into a
//! single `wd:Job_Description` element. The management level and job family
//! reference codes are not derived from the payload; they come from config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::models::description::{DescriptionField, DescriptionPayload};

const ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
const WD_NS: &str = "urn:com.workday/bsvc";
const WD_VERSION: &str = "v44.1";

/// Reference codes stamped on every exported profile.
#[derive(Debug, Clone)]
pub struct ExportReferences {
    pub management_level_id: String,
    pub job_family_id: String,
}

/// `Senior Data Analyst` → `SENIOR_DATA_ANALYST`. Path separators never survive.
pub fn job_code(profile_name: &str) -> String {
    profile_name
        .split_whitespace()
        .map(|word| word.to_uppercase().replace(['/', '\\'], "_"))
        .collect::<Vec<_>>()
        .join("_")
}

/// Labelled concatenation of every non-blank field, in registry order.
pub fn combined_description(payload: &DescriptionPayload) -> String {
    DescriptionField::ALL
        .into_iter()
        .filter_map(|field| {
            let value = payload.get(field)?.trim();
            (!value.is_empty()).then(|| format!("{}: {value}", field.label()))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

type XmlWriter = Writer<Vec<u8>>;

fn open(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> quick_xml::Result<()> {
    w.write_event(Event::Start(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))
}

fn close(w: &mut XmlWriter, name: &str) -> quick_xml::Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))
}

fn leaf(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)], text: &str) -> quick_xml::Result<()> {
    open(w, name, attrs)?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    close(w, name)
}

/// Renders the import document for one profile.
pub fn build_job_profile_xml(
    profile_name: &str,
    payload: &DescriptionPayload,
    refs: &ExportReferences,
    effective_date: NaiveDate,
) -> Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 4);
    let code = job_code(profile_name);
    let date = effective_date.format("%Y-%m-%d").to_string();

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    open(&mut w, "env:Envelope", &[("xmlns:env", ENV_NS), ("xmlns:xsd", XSD_NS)])?;
    open(&mut w, "env:Body", &[])?;
    open(
        &mut w,
        "wd:Submit_Job_Profile_Request",
        &[
            ("xmlns:wd", WD_NS),
            ("wd:Add_Only", "true"),
            ("wd:version", WD_VERSION),
        ],
    )?;

    open(&mut w, "wd:Business_Process_Parameters", &[])?;
    leaf(&mut w, "wd:Auto_Complete", &[], "true")?;
    leaf(&mut w, "wd:Run_Now", &[], "true")?;
    leaf(&mut w, "wd:Discard_On_Exit_Validation_Error", &[], "true")?;
    close(&mut w, "wd:Business_Process_Parameters")?;

    open(&mut w, "wd:Job_Profile_Data", &[])?;
    open(&mut w, "wd:Job_Profile_Request_Data", &[])?;
    leaf(&mut w, "wd:Job_Code", &[], &code)?;
    leaf(&mut w, "wd:Effective_Date", &[], &date)?;

    open(&mut w, "wd:Job_Profile_Basic_Data", &[])?;
    leaf(&mut w, "wd:Inactive", &[], "false")?;
    leaf(&mut w, "wd:Job_Title", &[], profile_name)?;
    leaf(&mut w, "wd:Job_Description", &[], &combined_description(payload))?;

    open(&mut w, "wd:Management_Level_Reference", &[])?;
    leaf(
        &mut w,
        "wd:ID",
        &[("wd:type", "Management_Level_ID")],
        &refs.management_level_id,
    )?;
    close(&mut w, "wd:Management_Level_Reference")?;

    open(&mut w, "wd:Job_Family_Data", &[])?;
    open(&mut w, "wd:Job_Family_Reference", &[])?;
    leaf(&mut w, "wd:ID", &[("wd:type", "Job_Family_ID")], &refs.job_family_id)?;
    close(&mut w, "wd:Job_Family_Reference")?;
    close(&mut w, "wd:Job_Family_Data")?;

    close(&mut w, "wd:Job_Profile_Basic_Data")?;
    close(&mut w, "wd:Job_Profile_Request_Data")?;
    close(&mut w, "wd:Job_Profile_Data")?;
    close(&mut w, "wd:Submit_Job_Profile_Request")?;
    close(&mut w, "env:Body")?;
    close(&mut w, "env:Envelope")?;

    String::from_utf8(w.into_inner()).context("export document is not valid UTF-8")
}

/// Writes `<dir>/<JOB_CODE>.xml` and returns its path.
pub async fn write_job_profile_xml(
    dir: &Path,
    profile_name: &str,
    payload: &DescriptionPayload,
    refs: &ExportReferences,
) -> Result<PathBuf> {
    let xml = build_job_profile_xml(profile_name, payload, refs, Utc::now().date_naive())?;

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating export directory {}", dir.display()))?;

    let path = dir.join(format!("{}.xml", job_code(profile_name)));
    tokio::fs::write(&path, xml)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    info!("Exported job profile '{profile_name}' to {}", path.display());
    Ok(path)
}
