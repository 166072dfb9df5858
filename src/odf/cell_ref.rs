use crate::common::errors::MergeError;

/// Sheet-qualified anchored cell reference, as statistic descriptors carry
/// them: `Sheet1.$B$2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub sheet: String,
    pub column: String,
    pub row: u32,
}

impl CellRef {
    pub fn parse(input: &str) -> Result<Self, MergeError> {
        let (sheet, cell) = input
            .split_once('.')
            .ok_or_else(|| MergeError::DescriptorFormat(format!("invalid column reference: {input}")))?;

        let mut parts = cell.split('$').map(str::trim).filter(|p| !p.is_empty());
        let column = parts
            .next()
            .ok_or_else(|| MergeError::DescriptorFormat(format!("invalid column reference: {input}")))?;
        let row_text = parts
            .next()
            .ok_or_else(|| MergeError::DescriptorFormat(format!("invalid column reference: {input}")))?;

        if column.is_empty() || !column.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(MergeError::DescriptorFormat(format!(
                "invalid column letters: {input}"
            )));
        }
        let row: u32 = row_text
            .parse()
            .map_err(|_| MergeError::DescriptorFormat(format!("invalid row number: {input}")))?;
        if row == 0 {
            return Err(MergeError::DescriptorFormat(format!(
                "row numbers start at 1: {input}"
            )));
        }

        Ok(Self {
            sheet: sheet.trim().to_string(),
            column: column.to_string(),
            row,
        })
    }

    /// Formula range covering `len` expanded rows: `[.B2:.B4]` for a
    /// three-row group anchored at `$B$2`.
    pub fn range(&self, len: usize) -> String {
        let end = self.row as i64 + len as i64 - 1;
        format!(
            "[.{col}{start}:.{col}{end}]",
            col = self.column,
            start = self.row,
            end = end
        )
    }
}
