use crate::clustering::Otu;
use crate::sequence::Sequence;
use agc_core::{AgcError, AgcResult};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::space1,
    combinator::{opt, rest},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Column width used when wrapping sequence lines
pub const DEFAULT_LINE_WIDTH: usize = 80;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Parse a FASTA header line (without its line ending) into id and description
fn parse_header(input: &[u8]) -> IResult<&[u8], (&[u8], Option<&[u8]>)> {
    let (input, _) = tag(&b">"[..])(input)?;
    let (input, id) = take_till(|c: u8| c == b' ' || c == b'\t')(input)?;
    let (input, description) = opt(preceded(space1, rest))(input)?;
    Ok((input, (id, description)))
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// Decoder and encoding failures mean the file content is unusable, not that the disk failed.
fn classify_read_error(err: io::Error, line: usize) -> AgcError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            AgcError::MalformedSequenceFile(format!("line {}: {}", line, err))
        }
        _ => AgcError::Io(err),
    }
}

/// Trait representing the capability to read FASTA files with automatic compression detection
pub trait FastaReadable {
    /// Open a FASTA file for reading. Gzip content is recognised by its magic
    /// bytes, whatever the file is called, and every concatenated member is read.
    fn open_for_reading<P: AsRef<Path>>(path: P) -> AgcResult<Box<dyn BufRead>> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);

        if reader.fill_buf()?.starts_with(&GZIP_MAGIC) {
            tracing::debug!("Reading {} as gzip", path.display());
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
        } else {
            Ok(Box::new(reader))
        }
    }
}

/// Zero-sized type that implements FastaReadable
pub struct FastaFile;

impl FastaReadable for FastaFile {}

/// Streaming FASTA parser.
///
/// Sequence lines are concatenated with all whitespace removed until the next
/// header or end of input. Records with no sequence data are skipped. Any
/// non-blank line before the first header is a [`AgcError::MalformedSequenceFile`].
pub struct FastaReader<R: BufRead> {
    reader: R,
    pending_header: Option<(String, Option<String>)>,
    line: Vec<u8>,
    line_number: usize,
    finished: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending_header: None,
            line: Vec::new(),
            line_number: 0,
            finished: false,
        }
    }

    fn read_line(&mut self) -> AgcResult<bool> {
        self.line.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.line)
            .map_err(|e| classify_read_error(e, self.line_number + 1))?;
        if n == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        while matches!(self.line.last(), Some(b'\n') | Some(b'\r')) {
            self.line.pop();
        }
        Ok(true)
    }

    fn header_from_line(&self) -> AgcResult<(String, Option<String>)> {
        let (_, (id, description)) = parse_header(&self.line).map_err(|_| {
            AgcError::MalformedSequenceFile(format!(
                "line {}: unreadable header",
                self.line_number
            ))
        })?;
        let to_string = |bytes: &[u8]| {
            std::str::from_utf8(bytes).map(str::to_string).map_err(|_| {
                AgcError::MalformedSequenceFile(format!(
                    "line {}: header is not valid UTF-8",
                    self.line_number
                ))
            })
        };
        let id = to_string(id)?;
        let description = description.map(to_string).transpose()?;
        Ok((id, description))
    }

    fn next_record(&mut self) -> AgcResult<Option<Sequence>> {
        let mut sequence = Vec::new();

        loop {
            if !self.read_line()? {
                self.finished = true;
                return Ok(self
                    .pending_header
                    .take()
                    .map(|(id, description)| build_record(id, description, sequence)));
            }

            if self.line.first() == Some(&b'>') {
                let header = self.header_from_line()?;
                if let Some((id, description)) = self.pending_header.replace(header) {
                    return Ok(Some(build_record(id, description, sequence)));
                }
                continue;
            }

            if self.pending_header.is_none() {
                if self.line.iter().all(|c| c.is_ascii_whitespace()) {
                    continue;
                }
                return Err(AgcError::MalformedSequenceFile(format!(
                    "line {}: sequence data before the first '>' header",
                    self.line_number
                )));
            }

            sequence.extend(self.line.iter().copied().filter(|c| !c.is_ascii_whitespace()));
        }
    }
}

fn build_record(id: String, description: Option<String>, sequence: Vec<u8>) -> Sequence {
    let record = Sequence::new(id, sequence);
    match description {
        Some(desc) => record.with_description(desc),
        None => record,
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = AgcResult<Sequence>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.next_record() {
                Ok(Some(record)) if record.is_empty() => continue,
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => return None,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Open an amplicon file and stream the records at least `min_seq_len` bases long.
pub fn read_amplicons<P: AsRef<Path>>(
    path: P,
    min_seq_len: usize,
) -> AgcResult<impl Iterator<Item = AgcResult<Sequence>>> {
    let reader = FastaReader::new(FastaFile::open_for_reading(path)?);
    Ok(reader.filter(move |record| match record {
        Ok(seq) => seq.len() >= min_seq_len,
        Err(_) => true,
    }))
}

/// Parse every record of an in-memory FASTA buffer
pub fn parse_fasta_from_bytes(data: &[u8]) -> AgcResult<Vec<Sequence>> {
    FastaReader::new(data).collect()
}

/// Output file, optionally gzip-compressed. Call [`OutputSink::finish`] to flush
/// buffers and write the gzip trailer.
enum OutputSink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputSink {
    fn create(path: &Path, compress: bool) -> AgcResult<Self> {
        let file = BufWriter::new(File::create(path)?);
        if compress || is_gzip_path(path) {
            Ok(OutputSink::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(OutputSink::Plain(file))
        }
    }

    fn finish(self) -> io::Result<()> {
        match self {
            OutputSink::Plain(mut w) => w.flush(),
            OutputSink::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Plain(w) => w.write(buf),
            OutputSink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Plain(w) => w.flush(),
            OutputSink::Gzip(w) => w.flush(),
        }
    }
}

fn write_wrapped<W: Write + ?Sized>(
    writer: &mut W,
    header: &str,
    sequence: &[u8],
    line_width: usize,
) -> io::Result<()> {
    writer.write_all(header.as_bytes())?;
    writer.write_all(b"\n")?;
    for chunk in sequence.chunks(line_width.max(1)) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Write sequences to any writer, wrapping sequence lines at `line_width`
pub fn write_fasta_to_writer<W: Write + ?Sized>(
    writer: &mut W,
    sequences: &[Sequence],
    line_width: usize,
) -> AgcResult<()> {
    for seq in sequences {
        write_wrapped(writer, &seq.header(), &seq.sequence, line_width)?;
    }
    Ok(())
}

/// Write sequences to a FASTA file; compressed when `compress` is set or the path ends in `.gz`
pub fn write_fasta<P: AsRef<Path>>(
    path: P,
    sequences: &[Sequence],
    line_width: usize,
    compress: bool,
) -> AgcResult<()> {
    let mut sink = OutputSink::create(path.as_ref(), compress)?;
    write_fasta_to_writer(&mut sink, sequences, line_width)?;
    sink.finish()?;
    Ok(())
}

/// Header for the OTU at zero-based position `index` of the clustering result
pub fn otu_header(index: usize, otu: &Otu) -> String {
    format!(">OTU_{} occurrence:{}", index + 1, otu.total_count)
}

/// Write OTUs in creation order as `>OTU_<n> occurrence:<count>` records
pub fn write_otus_to_writer<W: Write + ?Sized>(
    writer: &mut W,
    otus: &[Otu],
    line_width: usize,
) -> AgcResult<()> {
    for (i, otu) in otus.iter().enumerate() {
        write_wrapped(writer, &otu_header(i, otu), &otu.representative, line_width)?;
    }
    Ok(())
}

/// Write the OTU list to `path`; compressed when `compress` is set or the path ends in `.gz`
pub fn write_otus<P: AsRef<Path>>(
    path: P,
    otus: &[Otu],
    line_width: usize,
    compress: bool,
) -> AgcResult<()> {
    let path = path.as_ref();
    let mut sink = OutputSink::create(path, compress)?;
    write_otus_to_writer(&mut sink, otus, line_width)?;
    sink.finish()?;
    tracing::info!("Wrote {} OTUs to {}", otus.len(), path.display());
    Ok(())
}
