//! Session report: a renderer-independent document plus a PDF backend.

use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use vitafit_core::input::UserPersonalDetails;
use vitafit_core::plan::DietOutcome;
use vitafit_core::session::SessionRecord;

use crate::error::RenderError;

pub const REPORT_TITLE: &str = "Fitness and Diet Plan Report";
pub const NOT_YET_GENERATED: &str = "Not yet generated.";

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// Labeled key/value rows.
    Rows(Vec<(String, String)>),
    /// Informational placeholder text.
    Note(String),
    /// A stored failure, rendered as an error block.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub heading: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    pub fn section(&self, heading: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

/// `frequency_per_week` -> `Frequency Per Week`.
pub fn title_case_label(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn labeled(rows: Vec<(&'static str, String)>) -> SectionBody {
    SectionBody::Rows(
        rows.into_iter()
            .map(|(k, v)| (title_case_label(k), v))
            .collect(),
    )
}

fn section(heading: &str, body: SectionBody) -> ReportSection {
    ReportSection {
        heading: heading.to_string(),
        body,
    }
}

/// Assemble the report for a stored session in any state.
pub fn build_report(record: &SessionRecord, details: Option<&UserPersonalDetails>) -> ReportDocument {
    let mut sections = Vec::with_capacity(4);

    if let Some(rows) = details.map(UserPersonalDetails::rows).filter(|r| !r.is_empty()) {
        let rows = rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        sections.push(section("User Details", SectionBody::Rows(rows)));
    }

    sections.push(section(
        "Submitted Data",
        match &record.raw_user_input {
            Some(input) => labeled(input.rows()),
            None => SectionBody::Note("Not available.".into()),
        },
    ));

    sections.push(section(
        "Exercise Plan",
        match &record.exercise_predictions {
            Some(plan) => labeled(plan.rows()),
            None => SectionBody::Note(NOT_YET_GENERATED.into()),
        },
    ));

    sections.push(section(
        "Diet Plan",
        match &record.diet_predictions {
            Some(DietOutcome::Plan(plan)) => labeled(plan.rows()),
            Some(DietOutcome::Failed { error }) => SectionBody::Error(error.clone()),
            None => SectionBody::Note(NOT_YET_GENERATED.into()),
        },
    ));

    ReportDocument {
        title: REPORT_TITLE.to_string(),
        sections,
    }
}

/// Download name for a report, e.g. `Fitness_Report_abc_2026-03-01.pdf`.
///
/// Characters outside `[A-Za-z0-9_-]` in the session id become `_` so the
/// name is safe inside a `Content-Disposition` header.
pub fn report_filename(session_id: &str, date: NaiveDate) -> String {
    let safe: String = session_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("Fitness_Report_{safe}_{}.pdf", date.format("%Y-%m-%d"))
}

/// Turns a [`ReportDocument`] into bytes.
pub trait ReportRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>, RenderError>;
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

// US Letter
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 20.0;
const WRAP_COLUMNS: usize = 80;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;

/// Renders reports with the built-in Helvetica faces.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn pdf_err<E: std::fmt::Debug>(e: E) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Top-to-bottom text cursor that starts a new page when it runs out of room.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef, indent: f32) {
        let height = size * 0.3528 * 1.5;
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= height;
        self.layer.use_text(text, size, Mm(MARGIN + indent), Mm(self.y), font);
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

impl ReportRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, report: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        let (doc, page, layer) = PdfDocument::new(&report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

        {
            let mut cursor = Cursor {
                doc: &doc,
                layer: doc.get_page(page).get_layer(layer),
                y: PAGE_HEIGHT - MARGIN,
            };
            cursor.line(&report.title, TITLE_SIZE, &bold, 0.0);
            cursor.gap(5.0);

            for section in &report.sections {
                cursor.line(&format!("{}:", section.heading), HEADING_SIZE, &bold, 0.0);
                match &section.body {
                    SectionBody::Rows(rows) => {
                        for (label, value) in rows {
                            for (i, text) in wrap(&format!("{label}: {value}"), WRAP_COLUMNS).iter().enumerate() {
                                let indent = if i == 0 { 4.0 } else { 8.0 };
                                cursor.line(text, BODY_SIZE, &regular, indent);
                            }
                        }
                    }
                    SectionBody::Note(text) => {
                        for text in wrap(text, WRAP_COLUMNS) {
                            cursor.line(&text, BODY_SIZE, &regular, 4.0);
                        }
                    }
                    SectionBody::Error(text) => {
                        cursor.line("Error:", BODY_SIZE, &bold, 4.0);
                        for text in wrap(text, WRAP_COLUMNS) {
                            cursor.line(&text, BODY_SIZE, &regular, 8.0);
                        }
                    }
                }
                cursor.gap(5.0);
            }
        }

        doc.save_to_bytes().map_err(pdf_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitafit_core::input::UserInput;
    use vitafit_core::plan::{CoreFeatures, DietPlan, ExercisePlan};
    use vitafit_core::units::{HeightUnit, WeightUnit};

    fn exercise_only() -> SessionRecord {
        let input = UserInput {
            session_id: "r-1".into(),
            age: 52,
            gender: "Female".into(),
            height_value: 5.5,
            height_unit: HeightUnit::Feet,
            weight_value: 150.0,
            weight_unit: WeightUnit::Lbs,
            calories_intake: 1900,
        };
        let features = CoreFeatures {
            age: 52,
            gender: 0,
            height: 66.0,
            weight: 68.04,
            bmi: 24.21,
            calories_intake: 1900,
        };
        let plan = ExercisePlan {
            exercise_type: "Walking".into(),
            intensity_level: "Low".into(),
            frequency_per_week: 4,
            duration_minutes: 35.5,
            estimated_calorie_burn: 180.0,
        };
        SessionRecord::from_exercise(input, features, plan, chrono::Utc::now())
    }

    #[test]
    fn exercise_only_session_has_pending_diet_section() {
        let report = build_report(&exercise_only(), None);
        assert_eq!(report.title, REPORT_TITLE);
        assert!(report.section("User Details").is_none());
        assert_eq!(
            report.section("Diet Plan").unwrap().body,
            SectionBody::Note(NOT_YET_GENERATED.into())
        );
    }

    #[test]
    fn stored_diet_error_renders_as_error_block() {
        let mut record = exercise_only();
        record.diet_predictions = Some(DietOutcome::failed("model exploded"));
        let report = build_report(&record, None);
        assert!(matches!(
            &report.section("Diet Plan").unwrap().body,
            SectionBody::Error(msg) if msg.ends_with("model exploded")
        ));
    }

    #[test]
    fn sections_use_title_cased_labels() {
        let mut record = exercise_only();
        record.diet_predictions = Some(DietOutcome::Plan(DietPlan {
            recommended_calories: 1850.0,
            protein_grams_per_day: 95.5,
            carbs_grams_per_day: 210.0,
            fats_grams_per_day: 60.25,
        }));
        let details = UserPersonalDetails {
            first_name: Some("Ada".into()),
            email: Some("  ".into()),
            ..Default::default()
        };
        let report = build_report(&record, Some(&details));

        let headings: Vec<_> = report.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, ["User Details", "Submitted Data", "Exercise Plan", "Diet Plan"]);
        assert_eq!(
            report.section("User Details").unwrap().body,
            SectionBody::Rows(vec![("First Name".into(), "Ada".into())])
        );
        match &report.section("Exercise Plan").unwrap().body {
            SectionBody::Rows(rows) => assert_eq!(rows[2], ("Frequency Per Week".into(), "4".into())),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn blank_details_omit_the_section() {
        let details = UserPersonalDetails::default();
        let report = build_report(&exercise_only(), Some(&details));
        assert_eq!(report.sections.len(), 3);
    }

    #[test]
    fn title_case_handles_underscores() {
        assert_eq!(title_case_label("calories_intake"), "Calories Intake");
        assert_eq!(title_case_label("bmi"), "Bmi");
    }

    #[test]
    fn filename_is_dated_and_sanitized() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(report_filename("abc-123", date), "Fitness_Report_abc-123_2026-03-01.pdf");
        assert_eq!(report_filename("a\"b/c", date), "Fitness_Report_a_b_c_2026-03-01.pdf");
    }

    #[test]
    fn wrap_breaks_on_words_and_long_tokens() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn pdf_output_has_pdf_header() {
        let bytes = PdfRenderer::new().render(&build_report(&exercise_only(), None)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
