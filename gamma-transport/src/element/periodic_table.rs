// Generated periodic-table data, Z = 1..=118. Molar masses in g/mol
// (IUPAC 2021 standard atomic weights; conventional values for elements
// without a stable isotope, i.e. the mass number of the longest-lived isotope).
use super::AtomicElement;

pub(super) static PERIODIC_TABLE: [AtomicElement; 118] = [
    AtomicElement { z: 1, symbol: "H", name: "Hydrogen", molar_mass: 1.008 },
    AtomicElement { z: 2, symbol: "He", name: "Helium", molar_mass: 4.002602 },
    AtomicElement { z: 3, symbol: "Li", name: "Lithium", molar_mass: 6.94 },
    AtomicElement { z: 4, symbol: "Be", name: "Beryllium", molar_mass: 9.0121831 },
    AtomicElement { z: 5, symbol: "B", name: "Boron", molar_mass: 10.81 },
    AtomicElement { z: 6, symbol: "C", name: "Carbon", molar_mass: 12.011 },
    AtomicElement { z: 7, symbol: "N", name: "Nitrogen", molar_mass: 14.007 },
    AtomicElement { z: 8, symbol: "O", name: "Oxygen", molar_mass: 15.999 },
    AtomicElement { z: 9, symbol: "F", name: "Fluorine", molar_mass: 18.998403163 },
    AtomicElement { z: 10, symbol: "Ne", name: "Neon", molar_mass: 20.1797 },
    AtomicElement { z: 11, symbol: "Na", name: "Sodium", molar_mass: 22.98976928 },
    AtomicElement { z: 12, symbol: "Mg", name: "Magnesium", molar_mass: 24.305 },
    AtomicElement { z: 13, symbol: "Al", name: "Aluminium", molar_mass: 26.9815385 },
    AtomicElement { z: 14, symbol: "Si", name: "Silicon", molar_mass: 28.085 },
    AtomicElement { z: 15, symbol: "P", name: "Phosphorus", molar_mass: 30.973761998 },
    AtomicElement { z: 16, symbol: "S", name: "Sulfur", molar_mass: 32.06 },
    AtomicElement { z: 17, symbol: "Cl", name: "Chlorine", molar_mass: 35.45 },
    AtomicElement { z: 18, symbol: "Ar", name: "Argon", molar_mass: 39.948 },
    AtomicElement { z: 19, symbol: "K", name: "Potassium", molar_mass: 39.0983 },
    AtomicElement { z: 20, symbol: "Ca", name: "Calcium", molar_mass: 40.078 },
    AtomicElement { z: 21, symbol: "Sc", name: "Scandium", molar_mass: 44.955908 },
    AtomicElement { z: 22, symbol: "Ti", name: "Titanium", molar_mass: 47.867 },
    AtomicElement { z: 23, symbol: "V", name: "Vanadium", molar_mass: 50.9415 },
    AtomicElement { z: 24, symbol: "Cr", name: "Chromium", molar_mass: 51.9961 },
    AtomicElement { z: 25, symbol: "Mn", name: "Manganese", molar_mass: 54.938044 },
    AtomicElement { z: 26, symbol: "Fe", name: "Iron", molar_mass: 55.845 },
    AtomicElement { z: 27, symbol: "Co", name: "Cobalt", molar_mass: 58.933194 },
    AtomicElement { z: 28, symbol: "Ni", name: "Nickel", molar_mass: 58.6934 },
    AtomicElement { z: 29, symbol: "Cu", name: "Copper", molar_mass: 63.546 },
    AtomicElement { z: 30, symbol: "Zn", name: "Zinc", molar_mass: 65.38 },
    AtomicElement { z: 31, symbol: "Ga", name: "Gallium", molar_mass: 69.723 },
    AtomicElement { z: 32, symbol: "Ge", name: "Germanium", molar_mass: 72.63 },
    AtomicElement { z: 33, symbol: "As", name: "Arsenic", molar_mass: 74.921595 },
    AtomicElement { z: 34, symbol: "Se", name: "Selenium", molar_mass: 78.971 },
    AtomicElement { z: 35, symbol: "Br", name: "Bromine", molar_mass: 79.904 },
    AtomicElement { z: 36, symbol: "Kr", name: "Krypton", molar_mass: 83.798 },
    AtomicElement { z: 37, symbol: "Rb", name: "Rubidium", molar_mass: 85.4678 },
    AtomicElement { z: 38, symbol: "Sr", name: "Strontium", molar_mass: 87.62 },
    AtomicElement { z: 39, symbol: "Y", name: "Yttrium", molar_mass: 88.90584 },
    AtomicElement { z: 40, symbol: "Zr", name: "Zirconium", molar_mass: 91.224 },
    AtomicElement { z: 41, symbol: "Nb", name: "Niobium", molar_mass: 92.90637 },
    AtomicElement { z: 42, symbol: "Mo", name: "Molybdenum", molar_mass: 95.95 },
    AtomicElement { z: 43, symbol: "Tc", name: "Technetium", molar_mass: 98.0 },
    AtomicElement { z: 44, symbol: "Ru", name: "Ruthenium", molar_mass: 101.07 },
    AtomicElement { z: 45, symbol: "Rh", name: "Rhodium", molar_mass: 102.9055 },
    AtomicElement { z: 46, symbol: "Pd", name: "Palladium", molar_mass: 106.42 },
    AtomicElement { z: 47, symbol: "Ag", name: "Silver", molar_mass: 107.8682 },
    AtomicElement { z: 48, symbol: "Cd", name: "Cadmium", molar_mass: 112.414 },
    AtomicElement { z: 49, symbol: "In", name: "Indium", molar_mass: 114.818 },
    AtomicElement { z: 50, symbol: "Sn", name: "Tin", molar_mass: 118.71 },
    AtomicElement { z: 51, symbol: "Sb", name: "Antimony", molar_mass: 121.76 },
    AtomicElement { z: 52, symbol: "Te", name: "Tellurium", molar_mass: 127.6 },
    AtomicElement { z: 53, symbol: "I", name: "Iodine", molar_mass: 126.90447 },
    AtomicElement { z: 54, symbol: "Xe", name: "Xenon", molar_mass: 131.293 },
    AtomicElement { z: 55, symbol: "Cs", name: "Caesium", molar_mass: 132.90545196 },
    AtomicElement { z: 56, symbol: "Ba", name: "Barium", molar_mass: 137.327 },
    AtomicElement { z: 57, symbol: "La", name: "Lanthanum", molar_mass: 138.90547 },
    AtomicElement { z: 58, symbol: "Ce", name: "Cerium", molar_mass: 140.116 },
    AtomicElement { z: 59, symbol: "Pr", name: "Praseodymium", molar_mass: 140.90766 },
    AtomicElement { z: 60, symbol: "Nd", name: "Neodymium", molar_mass: 144.242 },
    AtomicElement { z: 61, symbol: "Pm", name: "Promethium", molar_mass: 145.0 },
    AtomicElement { z: 62, symbol: "Sm", name: "Samarium", molar_mass: 150.36 },
    AtomicElement { z: 63, symbol: "Eu", name: "Europium", molar_mass: 151.964 },
    AtomicElement { z: 64, symbol: "Gd", name: "Gadolinium", molar_mass: 157.25 },
    AtomicElement { z: 65, symbol: "Tb", name: "Terbium", molar_mass: 158.92535 },
    AtomicElement { z: 66, symbol: "Dy", name: "Dysprosium", molar_mass: 162.5 },
    AtomicElement { z: 67, symbol: "Ho", name: "Holmium", molar_mass: 164.93033 },
    AtomicElement { z: 68, symbol: "Er", name: "Erbium", molar_mass: 167.259 },
    AtomicElement { z: 69, symbol: "Tm", name: "Thulium", molar_mass: 168.93422 },
    AtomicElement { z: 70, symbol: "Yb", name: "Ytterbium", molar_mass: 173.045 },
    AtomicElement { z: 71, symbol: "Lu", name: "Lutetium", molar_mass: 174.9668 },
    AtomicElement { z: 72, symbol: "Hf", name: "Hafnium", molar_mass: 178.49 },
    AtomicElement { z: 73, symbol: "Ta", name: "Tantalum", molar_mass: 180.94788 },
    AtomicElement { z: 74, symbol: "W", name: "Tungsten", molar_mass: 183.84 },
    AtomicElement { z: 75, symbol: "Re", name: "Rhenium", molar_mass: 186.207 },
    AtomicElement { z: 76, symbol: "Os", name: "Osmium", molar_mass: 190.23 },
    AtomicElement { z: 77, symbol: "Ir", name: "Iridium", molar_mass: 192.217 },
    AtomicElement { z: 78, symbol: "Pt", name: "Platinum", molar_mass: 195.084 },
    AtomicElement { z: 79, symbol: "Au", name: "Gold", molar_mass: 196.966569 },
    AtomicElement { z: 80, symbol: "Hg", name: "Mercury", molar_mass: 200.592 },
    AtomicElement { z: 81, symbol: "Tl", name: "Thallium", molar_mass: 204.38 },
    AtomicElement { z: 82, symbol: "Pb", name: "Lead", molar_mass: 207.2 },
    AtomicElement { z: 83, symbol: "Bi", name: "Bismuth", molar_mass: 208.9804 },
    AtomicElement { z: 84, symbol: "Po", name: "Polonium", molar_mass: 209.0 },
    AtomicElement { z: 85, symbol: "At", name: "Astatine", molar_mass: 210.0 },
    AtomicElement { z: 86, symbol: "Rn", name: "Radon", molar_mass: 222.0 },
    AtomicElement { z: 87, symbol: "Fr", name: "Francium", molar_mass: 223.0 },
    AtomicElement { z: 88, symbol: "Ra", name: "Radium", molar_mass: 226.0 },
    AtomicElement { z: 89, symbol: "Ac", name: "Actinium", molar_mass: 227.0 },
    AtomicElement { z: 90, symbol: "Th", name: "Thorium", molar_mass: 232.0377 },
    AtomicElement { z: 91, symbol: "Pa", name: "Protactinium", molar_mass: 231.03588 },
    AtomicElement { z: 92, symbol: "U", name: "Uranium", molar_mass: 238.02891 },
    AtomicElement { z: 93, symbol: "Np", name: "Neptunium", molar_mass: 237.0 },
    AtomicElement { z: 94, symbol: "Pu", name: "Plutonium", molar_mass: 244.0 },
    AtomicElement { z: 95, symbol: "Am", name: "Americium", molar_mass: 243.0 },
    AtomicElement { z: 96, symbol: "Cm", name: "Curium", molar_mass: 247.0 },
    AtomicElement { z: 97, symbol: "Bk", name: "Berkelium", molar_mass: 247.0 },
    AtomicElement { z: 98, symbol: "Cf", name: "Californium", molar_mass: 251.0 },
    AtomicElement { z: 99, symbol: "Es", name: "Einsteinium", molar_mass: 252.0 },
    AtomicElement { z: 100, symbol: "Fm", name: "Fermium", molar_mass: 257.0 },
    AtomicElement { z: 101, symbol: "Md", name: "Mendelevium", molar_mass: 258.0 },
    AtomicElement { z: 102, symbol: "No", name: "Nobelium", molar_mass: 259.0 },
    AtomicElement { z: 103, symbol: "Lr", name: "Lawrencium", molar_mass: 266.0 },
    AtomicElement { z: 104, symbol: "Rf", name: "Rutherfordium", molar_mass: 267.0 },
    AtomicElement { z: 105, symbol: "Db", name: "Dubnium", molar_mass: 268.0 },
    AtomicElement { z: 106, symbol: "Sg", name: "Seaborgium", molar_mass: 269.0 },
    AtomicElement { z: 107, symbol: "Bh", name: "Bohrium", molar_mass: 270.0 },
    AtomicElement { z: 108, symbol: "Hs", name: "Hassium", molar_mass: 269.0 },
    AtomicElement { z: 109, symbol: "Mt", name: "Meitnerium", molar_mass: 278.0 },
    AtomicElement { z: 110, symbol: "Ds", name: "Darmstadtium", molar_mass: 281.0 },
    AtomicElement { z: 111, symbol: "Rg", name: "Roentgenium", molar_mass: 282.0 },
    AtomicElement { z: 112, symbol: "Cn", name: "Copernicium", molar_mass: 285.0 },
    AtomicElement { z: 113, symbol: "Nh", name: "Nihonium", molar_mass: 286.0 },
    AtomicElement { z: 114, symbol: "Fl", name: "Flerovium", molar_mass: 289.0 },
    AtomicElement { z: 115, symbol: "Mc", name: "Moscovium", molar_mass: 290.0 },
    AtomicElement { z: 116, symbol: "Lv", name: "Livermorium", molar_mass: 293.0 },
    AtomicElement { z: 117, symbol: "Ts", name: "Tennessine", molar_mass: 294.0 },
    AtomicElement { z: 118, symbol: "Og", name: "Oganesson", molar_mass: 294.0 },
];
