//! Stable integer identities for entities in the cell-state registry
//! (spec §9: flat arenas indexed by id, no cyclic ownership).

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(i: usize) -> Self {
                $name(i as u32)
            }
        }
    };
}

id_type!(ReactantId);
id_type!(ReactionId);
id_type!(SiteId);
id_type!(FamilyId);
