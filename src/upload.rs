use crate::{catalog::ResourceType, error::StashError};

/// The three ordered steps of the upload form. Navigation is strictly
/// forward/backward; a step only advances once its own fields validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Details,
    Classification,
    Source,
}

impl Step {
    fn next(self) -> Option<Step> {
        match self {
            Step::Details => Some(Step::Classification),
            Step::Classification => Some(Step::Source),
            Step::Source => None,
        }
    }

    fn prev(self) -> Option<Step> {
        match self {
            Step::Details => None,
            Step::Classification => Some(Step::Details),
            Step::Source => Some(Step::Classification),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Everything the form collects, all optional until validated.
#[derive(Debug, Clone, Default)]
pub struct UploadDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub subject: Option<String>,
    pub subjectcode: Option<String>,
    pub r#type: Option<ResourceType>,
    pub exam_year: Option<String>,
    pub exam_type: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub file: Option<FileAttachment>,
    pub file_url: Option<String>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl UploadDraft {
    /// Validate only the given step's fields.
    pub fn validate_step(&self, step: Step) -> Result<(), StashError> {
        let mut missing: Vec<&str> = Vec::new();

        match step {
            Step::Details => {
                if !filled(&self.title) {
                    missing.push("title");
                }
                if !filled(&self.description) {
                    missing.push("description");
                }
            }
            Step::Classification => {
                if !filled(&self.year) {
                    missing.push("year");
                }
                if !filled(&self.branch) {
                    missing.push("branch");
                }
                if !filled(&self.semester) {
                    missing.push("semester");
                }
                if !filled(&self.subject) {
                    missing.push("subject");
                }
                if !filled(&self.subjectcode) {
                    missing.push("subjectcode");
                }
                match self.r#type {
                    None => missing.push("type"),
                    Some(ResourceType::PreviousYearPapers) => {
                        if !filled(&self.exam_year) {
                            missing.push("examYear");
                        }
                        if !filled(&self.exam_type) {
                            missing.push("examType");
                        }
                    }
                    Some(_) => {}
                }
            }
            Step::Source => match (&self.file, filled(&self.file_url)) {
                (None, false) => missing.push("file or fileUrl"),
                (Some(_), true) => {
                    return Err(StashError::Validation(
                        "Provide either a file or a URL, not both".to_string(),
                    ))
                }
                _ => {}
            },
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StashError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Re-validate the full union and produce the submission. The author
    /// fields come from the signed-in identity rather than a form step.
    pub fn finish(self) -> Result<UploadRequest, StashError> {
        self.validate_step(Step::Details)?;
        self.validate_step(Step::Classification)?;
        self.validate_step(Step::Source)?;

        if !filled(&self.author) || !filled(&self.author_email) {
            return Err(StashError::Validation("Missing required fields".to_string()));
        }

        fn take(value: Option<String>, name: &str) -> Result<String, StashError> {
            value.ok_or_else(|| StashError::Validation(format!("Missing required field: {name}")))
        }

        let r#type = self
            .r#type
            .ok_or_else(|| StashError::Validation("Missing required field: type".to_string()))?;

        let exam = match r#type {
            ResourceType::PreviousYearPapers => Some((
                take(self.exam_year, "examYear")?,
                take(self.exam_type, "examType")?,
            )),
            _ => None,
        };

        let source = match self.file {
            Some(file) => UploadSource::File(file),
            None => UploadSource::Url(take(self.file_url, "fileUrl")?),
        };

        Ok(UploadRequest {
            title: take(self.title, "title")?,
            description: take(self.description, "description")?,
            year: take(self.year, "year")?,
            branch: take(self.branch, "branch")?,
            semester: take(self.semester, "semester")?,
            subject: take(self.subject, "subject")?,
            subjectcode: take(self.subjectcode, "subjectcode")?,
            r#type,
            exam,
            author: take(self.author, "author")?,
            author_email: take(self.author_email, "authorEmail")?,
            source,
        })
    }
}

/// Client-style wizard over the draft: step-scoped validation with
/// forward/backward navigation and no skipping.
#[derive(Debug, Clone, Default)]
pub struct UploadWizard {
    pub draft: UploadDraft,
    step: Step,
}

impl Default for Step {
    fn default() -> Self {
        Step::Details
    }
}

impl UploadWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Move to the next step if the current one validates.
    pub fn advance(&mut self) -> Result<Step, StashError> {
        self.draft.validate_step(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Move back one step; never validates.
    pub fn back(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Submit from the final step.
    pub fn finish(self) -> Result<UploadRequest, StashError> {
        if self.step != Step::Source {
            return Err(StashError::Validation(
                "Upload form is not complete".to_string(),
            ));
        }
        self.draft.finish()
    }
}

#[derive(Debug, Clone)]
pub enum UploadSource {
    File(FileAttachment),
    Url(String),
}

/// A fully validated submission.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub description: String,
    pub year: String,
    pub branch: String,
    pub semester: String,
    pub subject: String,
    pub subjectcode: String,
    pub r#type: ResourceType,
    pub exam: Option<(String, String)>,
    pub author: String,
    pub author_email: String,
    pub source: UploadSource,
}

impl UploadRequest {
    /// The stored title. For previous-year papers the exam metadata is baked
    /// into the title once, at submission; this is not reversible.
    pub fn formatted_title(&self) -> String {
        match &self.exam {
            Some((exam_year, exam_type)) => format!(
                "{}_{}_{}_{}",
                self.subjectcode, exam_year, exam_type, self.title
            ),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> UploadDraft {
        UploadDraft {
            title: Some("DSA Notes".to_string()),
            description: Some("Unit 1 to 4".to_string()),
            year: Some("2".to_string()),
            branch: Some("Computer Science".to_string()),
            semester: Some("3".to_string()),
            subject: Some("Data Structures".to_string()),
            subjectcode: Some("CSPC-203".to_string()),
            r#type: Some(ResourceType::NotesOrPpt),
            author: Some("A Student".to_string()),
            author_email: Some("a@nitj.ac.in".to_string()),
            file_url: Some("https://example.com/dsa.pdf".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn cannot_advance_past_empty_details() {
        let mut wizard = UploadWizard::new();
        assert!(wizard.advance().is_err());
        assert_eq!(wizard.step(), Step::Details);
    }

    #[test]
    fn walks_forward_and_backward() {
        let mut wizard = UploadWizard::new();
        wizard.draft = full_draft();

        assert_eq!(wizard.advance().unwrap(), Step::Classification);
        assert_eq!(wizard.advance().unwrap(), Step::Source);
        assert_eq!(wizard.back(), Step::Classification);
        assert_eq!(wizard.back(), Step::Details);
        // No step before the first
        assert_eq!(wizard.back(), Step::Details);
    }

    #[test]
    fn step_validation_is_scoped() {
        // A draft with only the detail fields passes step one even though
        // later steps are empty.
        let draft = UploadDraft {
            title: Some("DSA Notes".to_string()),
            description: Some("notes".to_string()),
            ..Default::default()
        };
        assert!(draft.validate_step(Step::Details).is_ok());
        assert!(draft.validate_step(Step::Classification).is_err());
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let draft = UploadDraft {
            title: Some("   ".to_string()),
            description: Some("notes".to_string()),
            ..Default::default()
        };
        assert!(draft.validate_step(Step::Details).is_err());
    }

    #[test]
    fn cannot_finish_before_last_step() {
        let mut wizard = UploadWizard::new();
        wizard.draft = full_draft();
        wizard.advance().unwrap();

        assert!(wizard.finish().is_err());
    }

    #[test]
    fn exam_fields_required_only_for_previous_year_papers() {
        let mut draft = full_draft();
        draft.r#type = Some(ResourceType::PreviousYearPapers);
        assert!(draft.validate_step(Step::Classification).is_err());

        draft.exam_year = Some("2024".to_string());
        draft.exam_type = Some("MidSem".to_string());
        assert!(draft.validate_step(Step::Classification).is_ok());
    }

    #[test]
    fn exactly_one_source() {
        let mut draft = full_draft();
        draft.file = Some(FileAttachment {
            name: "dsa.pdf".to_string(),
            bytes: vec![1],
        });
        assert!(draft.validate_step(Step::Source).is_err());

        draft.file_url = None;
        assert!(draft.validate_step(Step::Source).is_ok());
    }

    #[test]
    fn plain_title_passes_through() {
        let request = full_draft().finish().unwrap();
        assert_eq!(request.formatted_title(), "DSA Notes");
    }

    #[test]
    fn previous_year_paper_title_is_derived() {
        let mut draft = full_draft();
        draft.r#type = Some(ResourceType::PreviousYearPapers);
        draft.exam_year = Some("2024".to_string());
        draft.exam_type = Some("MidSem".to_string());

        let request = draft.finish().unwrap();
        assert_eq!(request.formatted_title(), "CSPC-203_2024_MidSem_DSA Notes");
    }

    #[test]
    fn finish_requires_author_identity() {
        let mut draft = full_draft();
        draft.author_email = None;
        assert!(draft.finish().is_err());
    }
}
