use std::path::Path;

use anyhow::Context;
use compress_io::compress::CompressIo;
use indexmap::IndexMap;
use serde::Serialize;
use utils::get_next_line;

/// Name of the FastQC text report within a sample result directory
pub const FASTQC_DATA_FILE: &str = "fastqc_data.txt";

const SECTION_PREFIX: &str = ">>";
const SECTION_END: &str = ">>END_MODULE";
const OVER_SEQ_SECTION: &str = "Overrepresented sequences";
const OVER_SEQ_HEADER: &str = "#Seq";

/// One overrepresented sequence row.  Fields are kept exactly as written
/// in the report; no numeric conversion is done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverSeq {
    pub seq: String,
    pub count: String,
    pub percentage: String,
    pub possible_source: String,
}

/// Parsed per-sample FastQC report
///
/// qc_info - check name to status, in report order
/// over_seq - overrepresented sequence rows, in report order
///
#[derive(Debug, Default)]
pub struct FastqcData {
    pub qc_info: IndexMap<String, String>,
    pub over_seq: Vec<OverSeq>,
}

/// Parse a FastQC text report by brute force.  Sections open with a
/// '>>name<tab>status' line and close with '>>END_MODULE'; the status is
/// whatever follows the rightmost tab.  Only the body of the
/// Overrepresented sequences section is read, every other section body
/// is skipped
pub fn read_fastqc_data<P: AsRef<Path>>(path: P) -> anyhow::Result<FastqcData> {
    let path = path.as_ref();
    debug!("Reading FastQC data from {}", path.display());

    let mut rdr = CompressIo::new()
        .path(path)
        .bufreader()
        .with_context(|| format!("Could not open FastQC data file {}", path.display()))?;

    let mut buf = String::new();
    let mut line = 0;
    let mut data = FastqcData::default();
    // Set while inside the Overrepresented sequences section
    let mut in_over_seq = false;

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, path.display()))?
    {
        line += 1;
        if in_over_seq && !fields[0].starts_with(SECTION_END) {
            // Body of the overrepresented sequences section; skip the
            // column header, everything else must be a data row
            if !fields[0].starts_with(OVER_SEQ_HEADER) {
                match fields.as_slice() {
                    [seq, count, percentage, possible_source] => data.over_seq.push(OverSeq {
                        seq: (*seq).to_owned(),
                        count: (*count).to_owned(),
                        percentage: (*percentage).to_owned(),
                        possible_source: (*possible_source).to_owned(),
                    }),
                    _ => {
                        return Err(anyhow!(
                            "{}:{} Expected 4 fields in overrepresented sequence row (found {})",
                            path.display(),
                            line,
                            fields.len()
                        ))
                    }
                }
            }
        } else if fields[0].starts_with(SECTION_END) {
            in_over_seq = false;
        } else if fields[0].starts_with(SECTION_PREFIX) {
            let (status, mut name) = match fields.split_last() {
                Some((st, rest)) if !rest.is_empty() => (*st, rest.join("\t")),
                _ => {
                    return Err(anyhow!(
                        "{}:{} Module line without status",
                        path.display(),
                        line
                    ))
                }
            };
            let desc = name.split_off(SECTION_PREFIX.len());
            in_over_seq = desc == OVER_SEQ_SECTION;
            data.qc_info.insert(desc, status.to_owned());
        }
    }

    if in_over_seq {
        return Err(anyhow!(
            "{}: Overrepresented sequences section not terminated",
            path.display()
        ));
    }

    debug!(
        "{}: {} checks, {} overrepresented sequences",
        path.display(),
        data.qc_info.len(),
        data.over_seq.len()
    );

    Ok(data)
}

/// Image file produced by FastQC for each check that has a plot
pub const CHECK_IMAGE: &[(&str, &str)] = &[
    ("Per base sequence quality", "per_base_quality.png"),
    ("Per sequence quality scores", "per_sequence_quality.png"),
    ("Per base sequence content", "per_base_sequence_content.png"),
    ("Per base GC content", "per_base_gc_content.png"),
    ("Per sequence GC content", "per_sequence_gc_content.png"),
    ("Per base N content", "per_base_n_content.png"),
    (
        "Sequence Length Distribution",
        "sequence_length_distribution.png",
    ),
    ("Sequence Duplication Levels", "duplication_levels.png"),
];

/// Checks with no associated image
pub const CHECK_NO_IMAGE: &[&str] = &[
    "Basic Statistics",
    "Overrepresented sequences",
    "Kmer Content",
];

/// Display glyph for each check status
pub const STATUS_GLYPH: &[(&str, &str)] = &[
    ("pass", "glyphicon-ok"),
    ("warn", "glyphicon-exclamation-sign"),
    ("fail", "glyphicon-remove"),
];

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_report(content: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join(FASTQC_DATA_FILE);
        fs::write(&p, content).unwrap();
        (tmp, p)
    }

    const REPORT: &str = concat!(
        "##FastQC\t0.10.1\n",
        ">>Basic Statistics\tpass\n",
        "#Measure\tValue\n",
        "Filename\ttest.fastq\n",
        ">>END_MODULE\n",
        ">>Per base sequence quality\tpass\n",
        ">>END_MODULE\n",
        ">>Overrepresented sequences\twarn\n",
        "#Sequence\tCount\tPercentage\tPossible Source\n",
        "ACGT\t10\t0.5\tsource1\n",
        "TTGA\t7\t0.2\tNo Hit\n",
        ">>END_MODULE\n",
        ">>Kmer Content\tfail\n",
        ">>END_MODULE\n",
    );

    #[test]
    fn checks_recorded_in_report_order() {
        let (_tmp, p) = write_report(REPORT);
        let data = read_fastqc_data(&p).unwrap();
        let checks: Vec<_> = data.qc_info.keys().collect();
        assert_eq!(
            checks,
            [
                "Basic Statistics",
                "Per base sequence quality",
                "Overrepresented sequences",
                "Kmer Content"
            ]
        );
        assert_eq!(data.qc_info["Per base sequence quality"], "pass");
        assert_eq!(data.qc_info["Overrepresented sequences"], "warn");
        assert_eq!(data.qc_info["Kmer Content"], "fail");
    }

    #[test]
    fn over_seq_rows_extracted_without_header() {
        let (_tmp, p) = write_report(REPORT);
        let data = read_fastqc_data(&p).unwrap();
        assert_eq!(
            data.over_seq,
            [
                OverSeq {
                    seq: "ACGT".to_owned(),
                    count: "10".to_owned(),
                    percentage: "0.5".to_owned(),
                    possible_source: "source1".to_owned(),
                },
                OverSeq {
                    seq: "TTGA".to_owned(),
                    count: "7".to_owned(),
                    percentage: "0.2".to_owned(),
                    possible_source: "No Hit".to_owned(),
                }
            ]
        );
    }

    #[test]
    fn empty_over_seq_section_is_ok() {
        let (_tmp, p) = write_report(concat!(
            ">>Overrepresented sequences\tpass\n",
            ">>END_MODULE\n",
        ));
        let data = read_fastqc_data(&p).unwrap();
        assert_eq!(data.qc_info["Overrepresented sequences"], "pass");
        assert!(data.over_seq.is_empty());
    }

    #[test]
    fn bad_field_count_in_over_seq_row_fails() {
        let (_tmp, p) = write_report(concat!(
            ">>Overrepresented sequences\twarn\n",
            "ACGT\t10\t0.5\n",
            ">>END_MODULE\n",
        ));
        assert!(read_fastqc_data(&p).is_err());
    }

    #[test]
    fn unterminated_over_seq_section_fails() {
        let (_tmp, p) = write_report(concat!(
            ">>Overrepresented sequences\twarn\n",
            "ACGT\t10\t0.5\tsource1\n",
        ));
        assert!(read_fastqc_data(&p).is_err());
    }

    #[test]
    fn section_line_without_status_fails() {
        let (_tmp, p) = write_report(">>Basic Statistics\n>>END_MODULE\n");
        assert!(read_fastqc_data(&p).is_err());
    }

    #[test]
    fn missing_report_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_fastqc_data(tmp.path().join(FASTQC_DATA_FILE)).is_err());
    }
}
