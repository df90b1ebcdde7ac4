//! Shared helpers for pdftools-core integration tests

#![allow(dead_code)]

use lopdf::{content::Content, content::Operation, dictionary, Dictionary, Document, Object, Stream};
use pdftools_core::{DocumentModel, InputFile, LopdfBackend, PdfBackend, TextLayer};

/// Build a PDF whose pages have the given sizes; page `n` shows
/// `{label} {n}`. Pages carry their own MediaBox and font resources.
pub fn build_pdf(sizes: &[(f64, f64)], label: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for (i, (width, height)) in sizes.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 14.into()]),
                Operation::new("Td", vec![72.into(), 72.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("{} {}", label, i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(*width as f32), Object::Real(*height as f32)],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A Letter-size document with `pages` pages
pub fn letter_pdf(pages: usize, label: &str) -> InputFile {
    let sizes = vec![(612.0, 792.0); pages];
    InputFile::new(format!("{}.pdf", label.to_lowercase()), build_pdf(&sizes, label))
}

/// Text of each page, in order
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = LopdfBackend.load(bytes).unwrap();
    (0..doc.page_count())
        .map(|i| doc.text_fragments(i).unwrap().join(" "))
        .collect()
}

pub fn page_count(bytes: &[u8]) -> usize {
    LopdfBackend.load(bytes).unwrap().page_count()
}

pub fn rotations(bytes: &[u8]) -> Vec<i32> {
    let doc = LopdfBackend.load(bytes).unwrap();
    (0..doc.page_count())
        .map(|i| doc.page_info(i).unwrap().rotation)
        .collect()
}
