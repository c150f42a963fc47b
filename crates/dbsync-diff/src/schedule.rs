//! Grouping & Scheduler (spec.md §4.4): partitions altered tables into
//! isolated singleton groups and one linked group, isolated first.

use crate::diff::{AlterKind, TableAlterData};

/// A named batch of alterations to submit as one unit (spec.md §4.4 — within
/// a group, statements are concatenated and submitted together).
pub struct Group {
    pub key: String,
    pub alters: Vec<TableAlterData>,
}

/// Partitioned, ordered run plan: every isolated group first, then the
/// single linked group (only present when non-empty).
pub struct Plan {
    pub isolated: Vec<Group>,
    pub linked: Option<Group>,
}

impl Plan {
    /// Iterates every group in apply order: isolated groups, then `linked`.
    pub fn groups_in_order(&self) -> impl Iterator<Item = &Group> {
        self.isolated.iter().chain(self.linked.iter())
    }
}

/// Groups non-`None` alters: a table is isolated only if none of its
/// foreign-key relations point at another table that is *also* being
/// altered this run; everything connected to another altered table through
/// a foreign-key edge (in either direction, transitively) lands in one
/// `multi` group (spec.md §4.4, scenario S5).
///
/// A table's own `related_tables()` only records its outgoing references
/// (spec.md §3), so `orders → users` alone would leave `users` looking
/// isolated even though its alteration must land in the same composite
/// statement as `orders`'s new foreign key. This builds the undirected
/// graph of altered tables connected by any such edge and takes connected
/// components, rather than trusting one-sided membership.
pub fn plan(alters: Vec<TableAlterData>) -> Plan {
    let altered: Vec<TableAlterData> = alters
        .into_iter()
        .filter(|a| a.kind != AlterKind::None)
        .collect();

    let mut dsu = DisjointSet::new(altered.iter().map(|a| a.table.clone()));
    for alter in &altered {
        for related in alter.related_tables() {
            if dsu.contains(&related) {
                dsu.union(&alter.table, &related);
            }
        }
    }

    let mut isolated = Vec::new();
    let mut linked_alters = Vec::new();
    for alter in altered {
        if dsu.component_size(&alter.table) > 1 {
            linked_alters.push(alter);
        } else {
            isolated.push(Group {
                key: format!("single:{}", alter.table),
                alters: vec![alter],
            });
        }
    }

    let linked = if linked_alters.is_empty() {
        None
    } else {
        Some(Group {
            key: "multi".to_string(),
            alters: linked_alters,
        })
    };

    Plan { isolated, linked }
}

/// Minimal union-find over table names, used only to find connected
/// components of the altered-table foreign-key graph.
struct DisjointSet {
    parent: std::collections::HashMap<String, String>,
    size: std::collections::HashMap<String, usize>,
}

impl DisjointSet {
    fn new(names: impl Iterator<Item = String>) -> Self {
        let mut parent = std::collections::HashMap::new();
        let mut size = std::collections::HashMap::new();
        for name in names {
            size.insert(name.clone(), 1);
            parent.insert(name.clone(), name);
        }
        Self { parent, size }
    }

    fn contains(&self, name: &str) -> bool {
        self.parent.contains_key(name)
    }

    fn find(&mut self, name: &str) -> String {
        let p = self.parent.get(name).cloned().unwrap_or_else(|| name.to_string());
        if p == name {
            return p;
        }
        let root = self.find(&p);
        self.parent.insert(name.to_string(), root.clone());
        root
    }

    fn union(&mut self, a: &str, b: &str) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let sa = *self.size.get(&ra).unwrap_or(&1);
        let sb = *self.size.get(&rb).unwrap_or(&1);
        let (small, big) = if sa < sb { (ra, rb) } else { (rb, ra) };
        self.parent.insert(small.clone(), big.clone());
        self.size.insert(big.clone(), sa + sb);
    }

    fn component_size(&mut self, name: &str) -> usize {
        let root = self.find(name);
        *self.size.get(&root).unwrap_or(&1)
    }
}

/// Composes a group's individual statements into the single unit the SQL
/// Applier submits: `;\n`-joined with a terminating `;` (spec.md §4.4).
pub fn compose_group_statement(group: &Group) -> String {
    let statements: Vec<&str> = group
        .alters
        .iter()
        .map(|a| a.statement.trim_end_matches(';').trim())
        .collect();
    format!("{};", statements.join(";\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{diff, IgnoreLists};

    #[test]
    fn isolated_table_gets_singleton_group() {
        let source = "CREATE TABLE `widgets` (\n  `id` int NOT NULL,\n  `a` int DEFAULT NULL\n) ENGINE=InnoDB";
        let alter = diff("widgets", source, "", false, IgnoreLists::default());
        let plan = plan(vec![alter]);
        assert_eq!(plan.isolated.len(), 1);
        assert_eq!(plan.isolated[0].key, "single:widgets");
        assert!(plan.linked.is_none());
    }

    #[test]
    fn s5_linked_tables_share_multi_group() {
        let orders_src = "CREATE TABLE `orders` (\n  `id` int NOT NULL,\n  `user_id` int NOT NULL,\n  `note` int DEFAULT NULL,\n  CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)\n) ENGINE=InnoDB";
        let orders_dst = "CREATE TABLE `orders` (\n  `id` int NOT NULL,\n  `user_id` int NOT NULL,\n  CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)\n) ENGINE=InnoDB";
        let users_src = "CREATE TABLE `users` (\n  `id` int NOT NULL,\n  `name` varchar(32) DEFAULT NULL\n) ENGINE=InnoDB";
        let users_dst = "CREATE TABLE `users` (\n  `id` int NOT NULL\n) ENGINE=InnoDB";

        let orders_alter = diff("orders", orders_src, orders_dst, false, IgnoreLists::default());
        let users_alter = diff("users", users_src, users_dst, false, IgnoreLists::default());

        let plan = plan(vec![orders_alter, users_alter]);
        assert!(plan.isolated.is_empty());
        let linked = plan.linked.unwrap();
        assert_eq!(linked.key, "multi");
        assert_eq!(linked.alters.len(), 2);
    }

    #[test]
    fn compose_joins_with_semicolon_newline() {
        let source_a = "CREATE TABLE `a` (\n  `id` int NOT NULL\n) ENGINE=InnoDB";
        let source_b = "CREATE TABLE `b` (\n  `id` int NOT NULL\n) ENGINE=InnoDB";
        let a = diff("a", source_a, "", false, IgnoreLists::default());
        let b = diff("b", source_b, "", false, IgnoreLists::default());
        let group = Group {
            key: "multi".to_string(),
            alters: vec![a, b],
        };
        let composed = compose_group_statement(&group);
        assert!(composed.contains(";\n"));
        assert!(composed.ends_with(';'));
    }
}
