use std::collections::HashMap;
use std::rc::Rc;

/// Tag names keyed to dense ids in first-seen order. Each name is stored once.
#[derive(Debug, Default)]
pub struct TagInterner {
    ids: HashMap<Rc<str>, usize>,
    names: Vec<Rc<str>>,
}

impl TagInterner {
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        let name: Rc<str> = Rc::from(name);
        self.ids.insert(Rc::clone(&name), id);
        self.names.push(name);
        id
    }

    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }
}

#[derive(Debug, Clone, Copy)]
struct PathNode {
    parent: Option<usize>,
    tag: usize,
}

/// Root-relative element paths as a trie of `(parent, tag)` pairs.
///
/// Memory is linear in the number of distinct paths regardless of depth;
/// a path only becomes a string when `render` is asked for it.
#[derive(Debug, Default)]
pub struct PathTrie {
    ids: HashMap<(Option<usize>, usize), usize>,
    nodes: Vec<PathNode>,
}

impl PathTrie {
    pub fn child(&mut self, parent: Option<usize>, tag: usize) -> usize {
        let next = self.nodes.len();
        let id = *self.ids.entry((parent, tag)).or_insert(next);
        if id == next {
            self.nodes.push(PathNode { parent, tag });
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn render(&self, id: usize, tags: &TagInterner) -> String {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            chain.push(self.nodes[node].tag);
            cursor = self.nodes[node].parent;
        }

        let mut path = String::new();
        for tag in chain.into_iter().rev() {
            path.push('/');
            path.push_str(tags.name(tag));
        }
        path
    }
}
