//! Exporter engine: IO side of the pipeline (fetching, file output,
//! conversion, asset resolution, packaging).
mod archive;
mod assembler;
mod attachments;
mod comments;
mod convert;
mod fetch;
mod filename;
mod package;
mod persist;
mod pipeline;
mod resolver;
mod types;

pub use archive::{raw_snapshot_url, ArchiveLookup, DEFAULT_AVAILABILITY_ENDPOINT};
pub use assembler::{
    destination_dir, rewrite_media, write_post, AssembleError, PostBundle, INDEX_FILENAME,
    MEDIA_LEDGER_FILENAME,
};
pub use attachments::{import_attachments, AttachmentError, AttachmentImport};
pub use comments::{build_comments_document, COMMENTS_FILENAME};
pub use convert::{convert_content, ContentFormat, ConvertedContent, Converter, Html2MdConverter};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{remote_asset_filename, run_directory_name, safe_filename, sanitize_with_dashes};
pub use package::{package, PackageError, ARCHIVE_PREFIX, CHECKPOINT_ENTRIES};
pub use persist::{ensure_output_dir, AtomicFileWriter, FileStore, LocalFileStore, PersistError};
pub use pipeline::{
    export_options, ExportError, ExportRun, ExportSettings, Exporter, FailedPost, PostError,
    CONFIG_FILENAME, STATIC_DIR,
};
pub use resolver::{AssetResolution, AssetResolver, ResolveError, RewriteLedger};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
