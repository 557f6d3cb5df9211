//! Shared on-disk fixtures for integration tests.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Repeating unit of the test chromosome; every position congruent to 4
/// (mod 16, 1-based) holds an 'A'
const UNIT: &str = "GACATTGCCTGAAGTC";

pub const FLANK: usize = 20;

pub const FORWARD_HEADER: &str =
    "SNP Name\tChromosome\tPosition\tAllele1 - Forward\tAllele2 - Forward\tB Allele Freq\tLog R Ratio";

pub const TOP_HEADER: &str =
    "SNP Name\tChromosome\tPosition\tAllele1 - Top\tAllele2 - Top\tB Allele Freq\tLog R Ratio";

const MANIFEST_HEADER: &str = "IlmnID,Name,IlmnStrand,SNP,AddressA_ID,AlleleA_ProbeSeq,\
AddressB_ID,AlleleB_ProbeSeq,GenomeBuild,Chr,MapInfo,Ploidy,Species,Source,SourceVersion,\
SourceStrand,SourceSeq,TopGenomicSeq,BeadSetId";

pub fn chr1() -> String {
    UNIT.repeat(16)
}

/// Manifest probe definition
pub struct Probe<'a> {
    pub name: &'a str,
    pub chrom: &'a str,
    pub pos: u64,
    pub alleles: (&'a str, &'a str),
    pub strand: &'a str,
    pub source_strand: &'a str,
}

impl<'a> Probe<'a> {
    pub fn top(name: &'a str, chrom: &'a str, pos: u64) -> Self {
        Self {
            name,
            chrom,
            pos,
            alleles: ("A", "G"),
            strand: "TOP",
            source_strand: "TOP",
        }
    }

    /// Manifest line with the flanking context copied from `sequence`
    fn line(&self, sequence: &str) -> String {
        let variant = usize::try_from(self.pos).unwrap() - 1;
        let before = &sequence[variant.saturating_sub(FLANK)..variant];
        let after = &sequence[variant + 1..(variant + 1 + FLANK).min(sequence.len())];
        let top_seq = format!("{before}[{}/{}]{after}", self.alleles.0, self.alleles.1);
        format!(
            "{name}-131_T_F_1,{name},{strand},[{a}/{b}],1,ACGT,,,38,{chrom},{pos},diploid,Homo sapiens,\
             PAGE,0,{source},{top_seq},{top_seq},1",
            name = self.name,
            strand = self.strand,
            a = self.alleles.0,
            b = self.alleles.1,
            chrom = self.chrom,
            pos = self.pos,
            source = self.source_strand,
        )
    }
}

/// One report row: probe, chromosome, position, two calls
pub type Call<'a> = (&'a str, &'a str, u64, &'a str, &'a str);

/// Temporary directory holding reference, manifest and reports
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a single-line-per-contig FASTA, with a `.fai` when `indexed`
    pub fn reference(&self, contigs: &[(&str, &str)], indexed: bool) -> PathBuf {
        let path = self.path("ref.fa");
        let mut fasta = String::new();
        let mut fai = String::new();
        for (name, seq) in contigs {
            let header = format!(">{name}\n");
            let offset = fasta.len() + header.len();
            writeln!(fai, "{name}\t{}\t{offset}\t{}\t{}", seq.len(), seq.len(), seq.len() + 1).unwrap();
            fasta.push_str(&header);
            fasta.push_str(seq);
            fasta.push('\n');
        }
        std::fs::write(&path, fasta).unwrap();
        if indexed {
            std::fs::write(self.path("ref.fa.fai"), fai).unwrap();
        }
        path
    }

    pub fn manifest(&self, probes: &[Probe<'_>], sequence: &str) -> PathBuf {
        let path = self.path("manifest.csv");
        let mut text = String::from("Illumina, Inc.\n[Heading]\nDescriptor File Name,test.bpm\n[Assay]\n");
        text.push_str(MANIFEST_HEADER);
        text.push('\n');
        for probe in probes {
            text.push_str(&probe.line(sequence));
            text.push('\n');
        }
        text.push_str("[Controls]\n0027630314,Staining,Red,DNP (High)\n");
        std::fs::write(&path, text).unwrap();
        path
    }

    pub fn report(&self, file_name: &str, header: &str, calls: &[Call<'_>]) -> PathBuf {
        let path = self.path(file_name);
        let mut text = format!("[Header]\nGSGT Version\t2.0.4\n[Data]\n{header}\n");
        for (i, (probe, chrom, pos, a1, a2)) in calls.iter().enumerate() {
            let pos = if *pos == 0 { String::new() } else { pos.to_string() };
            writeln!(text, "{probe}\t{chrom}\t{pos}\t{a1}\t{a2}\t0.{i}5\t-0.{i}25").unwrap();
        }
        std::fs::write(&path, text).unwrap();
        path
    }
}

/// Data lines of a VCF
pub fn records(vcf: &str) -> Vec<Vec<String>> {
    vcf.lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.split('\t').map(ToString::to_string).collect())
        .collect()
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
