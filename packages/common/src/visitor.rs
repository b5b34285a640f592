use postkit_model::{Document, ModelElement, ModelNode, Path};

/// Visitor pattern for traversing the model tree immutably
///
/// Every callback receives the path of the visited node. The default
/// implementations walk the entire tree in document order; override a
/// `visit_*` method to act on nodes and call the matching `walk_*` function
/// to keep descending.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_element(self, &Path::root(), doc.root());
    }

    fn visit_element(&mut self, path: &Path, element: &ModelElement) {
        walk_element(self, path, element);
    }

    fn visit_text(&mut self, _path: &Path, _data: &str) {
        // Leaf node, no children to walk
    }
}

/// Visit every child of `element`, which lives at `path`
pub fn walk_element<V: Visitor>(visitor: &mut V, path: &Path, element: &ModelElement) {
    for (index, child) in element.children.iter().enumerate() {
        let child_path = path.child(index);
        match child {
            ModelNode::Element(child) => visitor.visit_element(&child_path, child),
            ModelNode::Text { data } => visitor.visit_text(&child_path, data),
        }
    }
}

/// Collects the paths of descendant elements that satisfy a predicate
pub struct ElementCollector<F> {
    predicate: F,
    pub paths: Vec<Path>,
}

impl<F: FnMut(&ModelElement) -> bool> ElementCollector<F> {
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            paths: Vec::new(),
        }
    }
}

impl<F: FnMut(&ModelElement) -> bool> Visitor for ElementCollector<F> {
    fn visit_element(&mut self, path: &Path, element: &ModelElement) {
        if (self.predicate)(element) {
            self.paths.push(path.clone());
        }
        walk_element(self, path, element);
    }
}

/// Paths of the descendants of `element` (at `path`) matching `predicate`,
/// in document order
pub fn descendant_paths<F>(path: &Path, element: &ModelElement, predicate: F) -> Vec<Path>
where
    F: FnMut(&ModelElement) -> bool,
{
    let mut collector = ElementCollector::new(predicate);
    walk_element(&mut collector, path, element);
    collector.paths
}
