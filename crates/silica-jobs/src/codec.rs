//! Artifact retrieval and result merging.

use serde::de::DeserializeOwned;
use tracing::debug;

use silica_core::{
    Amplicon, ArtifactKind, CombinedResult, CompoundId, Encoding, Error, JobId, Primer,
    Result, ResultData,
};

use crate::store::JobStore;

/// A stored artifact ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// Suggested download name; only tabular artifacts are served as
    /// attachments.
    pub filename: Option<&'static str>,
}

impl Artifact {
    /// `Content-Disposition` header value.
    pub fn content_disposition(&self) -> String {
        match self.filename {
            Some(name) => format!("attachment; filename=\"{}\"", name),
            None => "inline".to_string(),
        }
    }
}

fn download_name(kind: ArtifactKind, encoding: Encoding) -> Option<&'static str> {
    match (encoding, kind) {
        (Encoding::Tabular, ArtifactKind::Primer) => Some("primers.csv"),
        (Encoding::Tabular, ArtifactKind::Amplicon) => Some("amplicons.csv"),
        (Encoding::Structured, _) => None,
    }
}

/// Fetch the artifact addressed by a compound identifier.
pub async fn load(store: &JobStore, id: &CompoundId) -> Result<Artifact> {
    let bytes = store
        .read_artifact(&id.job_id, id.kind, id.encoding)
        .await?
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    debug!(job_id = %id.job_id, kind = %id.kind, encoding = %id.encoding, size = bytes.len(), "codec: loaded artifact");
    Ok(Artifact {
        bytes,
        content_type: id.encoding.content_type(),
        filename: download_name(id.kind, id.encoding),
    })
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn decode<T: DeserializeOwned>(bytes: &[u8], encoding: Encoding) -> Result<Vec<T>> {
    if is_blank(bytes) {
        return Ok(Vec::new());
    }
    match encoding {
        Encoding::Structured => Ok(serde_json::from_slice(bytes)?),
        Encoding::Tabular => {
            let mut reader = csv::Reader::from_reader(bytes);
            let records = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
            Ok(records)
        }
    }
}

pub fn decode_primers(bytes: &[u8], encoding: Encoding) -> Result<Vec<Primer>> {
    decode(bytes, encoding)
}

pub fn decode_amplicons(bytes: &[u8], encoding: Encoding) -> Result<Vec<Amplicon>> {
    decode(bytes, encoding)
}

/// Combine both artifacts of a job into one payload.
///
/// Absent or blank artifacts contribute an empty list. `errors` starts
/// empty; callers attach execution problems.
pub fn merge(
    job_id: JobId,
    primer: Option<&[u8]>,
    amplicon: Option<&[u8]>,
    encoding: Encoding,
) -> Result<CombinedResult> {
    let data = ResultData {
        primer: primer
            .map(|b| decode_primers(b, encoding))
            .transpose()?
            .unwrap_or_default(),
        amplicon: amplicon
            .map(|b| decode_amplicons(b, encoding))
            .transpose()?
            .unwrap_or_default(),
    };
    debug!(
        %job_id,
        primer_count = data.primer.len(),
        amplicon_count = data.amplicon.len(),
        "codec: merged results"
    );
    Ok(CombinedResult {
        uuid: job_id,
        data,
        errors: Vec::new(),
    })
}

/// Read both artifacts of a job from the store and merge them.
pub async fn load_results(store: &JobStore, job_id: &JobId, encoding: Encoding) -> Result<CombinedResult> {
    let primer = store
        .read_artifact(job_id, ArtifactKind::Primer, encoding)
        .await?;
    let amplicon = store
        .read_artifact(job_id, ArtifactKind::Amplicon, encoding)
        .await?;
    merge(*job_id, primer.as_deref(), amplicon.as_deref(), encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_core::Orientation;

    const PRIMERS_JSON: &str = r#"[
        {"Id": 0, "Tm": 60.1, "Chrom": "chr4", "Pos": 154583, "Ori": "forward",
         "Name": "FGA_f", "Seq": "GCCCCATAGGTTTTGAACTCA", "Genome": "ttGCCCCATAGGTTTTGAACTCAga"},
        {"Id": 1, "Tm": 59.3, "Chrom": "chr4", "Pos": 154761, "Ori": "reverse",
         "Name": "FGA_r", "Seq": "TGATTTGTCTGTAATTGCCAGC", "Genome": "ccTGATTTGTCTGTAATTGCCAGCtt"}
    ]"#;

    const PRIMERS_CSV: &str = "Id,Tm,Chrom,Pos,Ori,Name,Seq,Genome\n\
        0,60.1,chr4,154583,forward,FGA_f,GCCCCATAGGTTTTGAACTCA,ttGCCCCATAGGTTTTGAACTCAga\n\
        1,59.3,chr4,154761,reverse,FGA_r,TGATTTGTCTGTAATTGCCAGC,ccTGATTTGTCTGTAATTGCCAGCtt\n";

    const AMPLICONS_CSV: &str = "Id,Length,Penalty,Chrom,ForPos,ForTm,ForName,ForSeq,RevPos,RevTm,RevName,RevSeq,Seq\n\
        0,200,0.12,chr4,154583,60.1,FGA_f,GCCCC,154761,59.3,FGA_r,TGATT,GCCCCAAATGATT\n";

    #[test]
    fn test_decode_both_encodings_agree() {
        let from_json = decode_primers(PRIMERS_JSON.as_bytes(), Encoding::Structured).unwrap();
        let from_csv = decode_primers(PRIMERS_CSV.as_bytes(), Encoding::Tabular).unwrap();
        assert_eq!(from_json, from_csv);
        assert_eq!(from_json.len(), 2);
        assert_eq!(from_json[1].ori, Orientation::Reverse);
    }

    #[test]
    fn test_decode_amplicons_csv() {
        let amplicons = decode_amplicons(AMPLICONS_CSV.as_bytes(), Encoding::Tabular).unwrap();
        assert_eq!(amplicons.len(), 1);
        assert_eq!(amplicons[0].length, 200);
        assert_eq!(amplicons[0].rev_name, "FGA_r");
    }

    #[test]
    fn test_decode_invalid_is_serialization_error() {
        let err = decode_primers(b"{not json", Encoding::Structured).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_merge_treats_absent_and_blank_as_empty() {
        let id = JobId::new_random();
        let merged = merge(id, None, Some(b"  \n"), Encoding::Structured).unwrap();
        assert_eq!(merged.uuid, id);
        assert!(merged.data.primer.is_empty());
        assert!(merged.data.amplicon.is_empty());
        assert!(merged.is_success());
    }

    #[test]
    fn test_merge_payload_shape() {
        let id = JobId::new_random();
        let merged = merge(id, Some(PRIMERS_JSON.as_bytes()), Some(b"[]"), Encoding::Structured)
            .unwrap();
        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["uuid"], id.to_string());
        assert_eq!(value["data"]["primer"].as_array().unwrap().len(), 2);
        assert_eq!(value["data"]["primer"][0]["Name"], "FGA_f");
        assert!(value["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            download_name(ArtifactKind::Amplicon, Encoding::Tabular),
            Some("amplicons.csv")
        );
        let artifact = Artifact {
            bytes: Vec::new(),
            content_type: "text/csv",
            filename: Some("primers.csv"),
        };
        assert_eq!(
            artifact.content_disposition(),
            "attachment; filename=\"primers.csv\""
        );
    }

    #[tokio::test]
    async fn test_load_serves_metadata_and_not_found() {
        let root = tempfile::tempdir().unwrap();
        let store = JobStore::new(root.path());
        let job_id = store.create_job().await.unwrap();
        let paths = store.paths_for(&job_id);
        std::fs::write(
            paths.artifact(ArtifactKind::Primer, Encoding::Tabular),
            PRIMERS_CSV,
        )
        .unwrap();

        let id = CompoundId::new(job_id, ArtifactKind::Primer, Encoding::Tabular);
        let artifact = load(&store, &id).await.unwrap();
        assert_eq!(artifact.content_type, "text/csv");
        assert_eq!(artifact.filename, Some("primers.csv"));
        assert_eq!(artifact.bytes, PRIMERS_CSV.as_bytes());

        let missing = CompoundId::new(job_id, ArtifactKind::Amplicon, Encoding::Structured);
        assert!(matches!(load(&store, &missing).await, Err(Error::NotFound(_))));
    }
}
