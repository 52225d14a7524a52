use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use super::ArchiveWriter;
use crate::error::ExportError;
use crate::evidence::EvidenceFile;

/// Deflate-compressed zip archive built entirely in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipWriter;

impl ArchiveWriter for ZipWriter {
    fn write(
        &self,
        primary_name: &str,
        primary: &[u8],
        logs: &[EvidenceFile],
    ) -> Result<Vec<u8>, ExportError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));

        archive.start_file(primary_name, options)?;
        archive.write_all(primary).map_err(|e| ExportError::Archive(e.to_string()))?;

        for file in logs {
            archive.start_file(file.archive_path(), options)?;
            archive
                .write_all(file.contents.as_bytes())
                .map_err(|e| ExportError::Archive(e.to_string()))?;
        }

        let cursor = archive.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn archive_holds_primary_and_logs() {
        let logs = vec![EvidenceFile {
            task_id: "t2".into(),
            task_number: 2,
            file_name: "scenario_02_checkout.txt".into(),
            contents: "POST /pay 502".into(),
        }];
        let bytes = ZipWriter.write("QA_Report_2026-03-09.pdf", b"%PDF-1.5", &logs).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut primary = Vec::new();
        archive
            .by_name("QA_Report_2026-03-09.pdf")
            .unwrap()
            .read_to_end(&mut primary)
            .unwrap();
        assert_eq!(primary, b"%PDF-1.5");

        let mut log = String::new();
        archive
            .by_name("logs/scenario_02_checkout.txt")
            .unwrap()
            .read_to_string(&mut log)
            .unwrap();
        assert_eq!(log, "POST /pay 502");
    }
}
