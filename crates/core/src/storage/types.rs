use std::cmp::Ordering;

use uuid::Uuid;

use crate::dataset::Entity;

/// The identity on whose behalf a repository query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    /// Fixed ID of the internal system actor.
    pub const SYSTEM_ID: Uuid = Uuid::from_u128(0x6a4b11e1_90ca_4e42_ba42_db7bc7f7d505);

    /// The internal system actor, used for cache loads.
    pub fn system() -> Self {
        Self {
            id: Self::SYSTEM_ID,
            name: "SYSTEM".to_string(),
        }
    }
}

/// Field a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    /// The numeric `order` field (statuses, markings).
    Order,
    /// The display name.
    Name,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    #[default]
    Asc,
    Desc,
}

/// Options for [`EntityRepository::list_entities`](super::EntityRepository::list_entities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    pub order_by: Option<OrderField>,
    pub order_mode: OrderMode,
}

impl ListOptions {
    /// Orders results by `field`, ascending.
    pub fn order_by(field: OrderField) -> Self {
        Self {
            order_by: Some(field),
            order_mode: OrderMode::Asc,
        }
    }

    /// Sets the sort direction.
    pub fn with_mode(mut self, mode: OrderMode) -> Self {
        self.order_mode = mode;
        self
    }

    /// Compares two entities according to these options.
    ///
    /// Records missing the ordering field sort after those that have it,
    /// regardless of direction. Without an `order_by` every pair is equal,
    /// so a stable sort keeps the original order.
    pub fn compare(&self, a: &Entity, b: &Entity) -> Ordering {
        match self.order_by {
            None => Ordering::Equal,
            Some(OrderField::Order) => compare_present(a.order(), b.order(), self.order_mode),
            Some(OrderField::Name) => compare_present(a.name(), b.name(), self.order_mode),
        }
    }
}

fn compare_present<T: Ord>(a: Option<T>, b: Option<T>, mode: OrderMode) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match mode {
            OrderMode::Asc => a.cmp(&b),
            OrderMode::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Rule, Status};

    fn status(order: i32) -> Entity {
        Entity::Status(Status::new(Uuid::nil(), "Report", order))
    }

    #[test]
    fn test_system_actor() {
        let actor = Actor::system();
        assert_eq!(actor.id, Actor::SYSTEM_ID);
        assert_eq!(actor.name, "SYSTEM");
    }

    #[test]
    fn test_order_ascending() {
        let options = ListOptions::order_by(OrderField::Order);
        let mut entities = vec![status(3), status(1), status(2)];
        entities.sort_by(|a, b| options.compare(a, b));
        let orders: Vec<_> = entities.iter().filter_map(Entity::order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_order_descending() {
        let options = ListOptions::order_by(OrderField::Order).with_mode(OrderMode::Desc);
        let mut entities = vec![status(1), status(3), status(2)];
        entities.sort_by(|a, b| options.compare(a, b));
        let orders: Vec<_> = entities.iter().filter_map(Entity::order).collect();
        assert_eq!(orders, vec![3, 2, 1]);
    }

    #[test]
    fn test_missing_field_sorts_last() {
        let options = ListOptions::order_by(OrderField::Order).with_mode(OrderMode::Desc);
        let rule = Entity::Rule(Rule::new("r", true));
        let mut entities = vec![rule.clone(), status(1)];
        entities.sort_by(|a, b| options.compare(a, b));
        assert_eq!(entities[1], rule);
    }

    #[test]
    fn test_default_keeps_order() {
        let options = ListOptions::default();
        let mut entities = vec![status(3), status(1)];
        entities.sort_by(|a, b| options.compare(a, b));
        let orders: Vec<_> = entities.iter().filter_map(Entity::order).collect();
        assert_eq!(orders, vec![3, 1]);
    }
}
