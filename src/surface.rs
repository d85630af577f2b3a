/// A named SVG drawing surface. Drawing appends elements; `clear` removes
/// everything drawn so far.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    name: String,
    width: f64,
    height: f64,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn push(&mut self, element: String) {
        self.elements.push(element);
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, elements: I) {
        self.elements.extend(elements);
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" data-panel="{}" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            escape_attr(&self.name),
            self.width,
            self.height,
            self.width,
            self.height
        );
        for element in &self.elements {
            svg.push_str(element);
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Escape text for use inside a double-quoted XML attribute.
pub fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
