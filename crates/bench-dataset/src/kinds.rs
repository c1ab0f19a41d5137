//! The datasets the benchmark scenarios run on.

use crate::error::DatasetError;
use crate::filler::filler_text;
use crate::reader::load_csv;
use bench_core::{ColumnDef, ColumnKind, Dataset, DatasetSchema, Patch, PatchRule, Value};
use std::path::Path;

/// Length of the replacement text written by the social media update phase.
pub const CONTENT_LENGTH: usize = 500;

/// A known input file and how its rows are typed, stored and updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Library loan records
    Loans,
    /// Social media user/post/comment records
    UserPostComments,
}

impl DatasetKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            DatasetKind::Loans => "loans.csv",
            DatasetKind::UserPostComments => "user_post_comments.csv",
        }
    }

    /// Collection/table/label the dataset is written to.
    pub fn target_name(&self) -> &'static str {
        match self {
            DatasetKind::Loans => "loans",
            DatasetKind::UserPostComments => "UserPostComment",
        }
    }

    pub fn schema(&self) -> DatasetSchema {
        match self {
            DatasetKind::Loans => DatasetSchema::new(
                vec![
                    ColumnDef::new("LoanID", ColumnKind::Int),
                    ColumnDef::new("BookID", ColumnKind::Int),
                    ColumnDef::new("MemberID", ColumnKind::Int),
                    ColumnDef::new("LoanDate", ColumnKind::Timestamp),
                    ColumnDef::new("DueDate", ColumnKind::Timestamp),
                    ColumnDef::new("ReturnDate", ColumnKind::Timestamp).nullable(),
                ],
                "LoanID",
            ),
            DatasetKind::UserPostComments => DatasetSchema::new(
                vec![
                    ColumnDef::new("PostCommentID", ColumnKind::Int),
                    ColumnDef::new("UserID", ColumnKind::Int),
                    ColumnDef::new("PostID", ColumnKind::Int),
                    ColumnDef::new("Content", ColumnKind::Text),
                ],
                "PostCommentID",
            ),
        }
    }

    /// The update applied by a write cycle over this dataset.
    ///
    /// Loans get a fresh `ReturnDate` each iteration; comments get their
    /// `Content` replaced by fixed-length filler text.
    pub fn patch_rule(&self, seed: u64) -> PatchRule {
        match self {
            DatasetKind::Loans => PatchRule::CurrentTime {
                field: "ReturnDate".to_string(),
            },
            DatasetKind::UserPostComments => PatchRule::Fixed(Patch::new(
                "Content",
                Value::Text(filler_text(CONTENT_LENGTH, seed)),
            )),
        }
    }

    /// Load the dataset from `data_dir`.
    pub fn load(&self, data_dir: &Path) -> Result<Dataset, DatasetError> {
        load_csv(
            &data_dir.join(self.file_name()),
            self.target_name(),
            self.schema(),
        )
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKind::Loans => write!(f, "loans"),
            DatasetKind::UserPostComments => write!(f, "user-post-comments"),
        }
    }
}
