// Shared by every bench target; each one only uses part of it.
#[allow(dead_code)]
pub fn generate_flat_document(sections: usize) -> String {
    let mut content = String::from("# Title\n\nIntro paragraph.\n\n");
    for section in 0..sections {
        content.push_str(&format!(
            "## Section {section}\n\nParagraph with some content.\n\n- Bullet point\n- Another item\n\n"
        ));
    }
    content
}

#[allow(dead_code)]
pub fn generate_nested_document(sections: usize, depth: usize) -> String {
    let mut content = String::new();
    for section in 0..sections {
        content.push_str(&format!("# Section {section}\n\n"));
        for level in 2..(2 + depth).min(7) {
            content.push_str(&format!(
                "{} Subsection Level {level}\n\nSome paragraph content for level {level}.\n\n",
                "#".repeat(level)
            ));
        }
    }
    content
}
